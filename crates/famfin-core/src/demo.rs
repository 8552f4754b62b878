//! Demo working set relative to a given day

use chrono::{Datelike, NaiveDate};

use crate::classify::Classifier;
use crate::models::{MonthKey, Transaction};

const DEMO_CARD_HOLDER: &str = "Demo";
const DEMO_CURRENCY: &str = "SEK";
const DEMO_OPENING_BALANCE: f64 = 50000.0;

/// (months back, day of month, description, amount)
const DEMO_ROWS: [(u32, u32, &str, f64); 9] = [
    (0, 1, "Lön AB", 35000.0),
    (0, 2, "Hyra", -12500.0),
    (0, 3, "ICA Kvantum", -1850.0),
    (0, 5, "SL biljett", -980.0),
    (0, 7, "Netflix", -179.0),
    (1, 2, "Hyra", -12500.0),
    (1, 3, "ICA Kvantum", -2100.0),
    (12, 1, "Lön AB", 32000.0),
    (12, 4, "ICA Kvantum", -1500.0),
];

/// Nine classified demo transactions spread over this month, last month and
/// the same month last year
pub fn demo_transactions(today: NaiveDate, classifier: &Classifier) -> Vec<Transaction> {
    let current = MonthKey::of(today);

    DEMO_ROWS
        .iter()
        .enumerate()
        .map(|(index, &(months_back, day, description, amount))| {
            let month = (0..months_back).fold(current, |m, _| m.previous());
            let date = month
                .first_day()
                .with_day(day)
                .unwrap_or_else(|| month.first_day());

            Transaction {
                date,
                description: description.to_string(),
                amount,
                balance: Some(DEMO_OPENING_BALANCE - index as f64 * 1000.0),
                category: classifier.classify(description, amount).to_string(),
                currency: DEMO_CURRENCY.to_string(),
                card_holder: Some(DEMO_CARD_HOLDER.to_string()),
            }
        })
        .collect()
}
