//! Domain models for FamFin

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;

/// A transaction in the working set
///
/// Serializes to the wire format used by the bulk sync endpoint:
/// `date` as `YYYY-MM-DD`, camelCase field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    /// Negative = outflow, positive = inflow
    pub amount: f64,
    /// Running account balance after this transaction
    pub balance: Option<f64>,
    /// Assigned by the classifier, user-overridable
    pub category: String,
    pub currency: String,
    pub card_holder: Option<String>,
}

impl Transaction {
    /// Stable dedup key over the immutable fields
    pub fn fingerprint(&self) -> String {
        crate::fingerprint::fingerprint(self)
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.date)
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// A transaction as persisted by the upsert store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: i64,
    pub fingerprint: String,
    #[serde(rename = "transaction_date")]
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub balance: Option<f64>,
    pub category: String,
    pub currency: String,
    pub card_holder: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredTransaction> for Transaction {
    fn from(stored: StoredTransaction) -> Self {
        Self {
            date: stored.date,
            description: stored.description,
            amount: stored.amount,
            balance: stored.balance,
            category: stored.category,
            currency: stored.currency,
            card_holder: stored.card_holder,
        }
    }
}

/// Outcome of a bulk upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpsertSummary {
    /// Transactions accepted (inserted + updated)
    pub saved: usize,
    /// New fingerprints
    pub inserted: usize,
    /// Existing fingerprints whose mutable fields were refreshed
    pub updated: usize,
}

/// Year-month bucket (`YYYY-MM`) used for filtering and comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (1..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        // Always valid: year and month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Same month one year earlier
    pub fn previous_year(&self) -> Self {
        Self {
            year: self.year - 1,
            month: self.month,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || Error::InvalidData(format!("Invalid month (expected YYYY-MM): {}", s));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_key_parse_and_display() {
        let key: MonthKey = "2024-03".parse().unwrap();
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month(), 3);
        assert_eq!(key.to_string(), "2024-03");

        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("2024".parse::<MonthKey>().is_err());
        assert!("24-03".parse::<MonthKey>().is_err());
        assert!("march".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_key_navigation() {
        let jan: MonthKey = "2024-01".parse().unwrap();
        assert_eq!(jan.previous().to_string(), "2023-12");
        assert_eq!(jan.next().to_string(), "2024-02");
        assert_eq!(jan.previous_year().to_string(), "2023-01");

        let dec: MonthKey = "2023-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2024-01");
        assert_eq!(dec.first_day(), date(2023, 12, 1));
    }

    #[test]
    fn test_month_key_contains() {
        let key = MonthKey::of(date(2024, 3, 5));
        assert!(key.contains(date(2024, 3, 31)));
        assert!(!key.contains(date(2024, 4, 1)));
        assert!(!key.contains(date(2023, 3, 5)));
    }

    #[test]
    fn test_transaction_wire_format() {
        let tx = Transaction {
            date: date(2024, 3, 5),
            description: "ICA Kvantum".to_string(),
            amount: -185.5,
            balance: Some(1200.0),
            category: "Mat & dagligvaror".to_string(),
            currency: "SEK".to_string(),
            card_holder: None,
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["date"], "2024-03-05");
        assert_eq!(json["amount"], -185.5);
        assert!(json.get("cardHolder").is_some());
        assert!(json.get("card_holder").is_none());
    }
}
