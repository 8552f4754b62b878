//! Report generation over the working set
//!
//! All functions here are pure views over a slice of transactions: filtering,
//! month listing, totals, month/year comparisons, insights and budget
//! progress. Results are plain serializable values.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::classify::normalize_text;
use crate::config::Config;
use crate::models::{MonthKey, Transaction};

/// Category filter value meaning "no filter"
pub const ALL_CATEGORIES: &str = "all";

/// Month, category and free-text filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub month: Option<MonthKey>,
    pub category: Option<String>,
    /// Normalized search text, matched as a substring
    search: Option<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn month(mut self, month: Option<MonthKey>) -> Self {
        self.month = month;
        self
    }

    /// Restrict to one category; `all` clears the restriction
    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_string);
        self
    }

    pub fn search(mut self, search: Option<&str>) -> Self {
        self.search = search.map(normalize_text).filter(|s| !s.is_empty());
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(month) = self.month {
            if !month.contains(tx.date) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &tx.category != category {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !normalize_text(&tx.description).contains(search.as_str()) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|tx| self.matches(tx)).collect()
    }
}

/// Distinct months present, ascending
pub fn months(transactions: &[Transaction]) -> Vec<MonthKey> {
    transactions
        .iter()
        .map(Transaction::month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Most recent month present; the default selection
pub fn latest_month(transactions: &[Transaction]) -> Option<MonthKey> {
    transactions.iter().map(Transaction::month).max()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    /// Sum of positive amounts
    pub income: f64,
    /// Sum of negative amounts (non-positive)
    pub expenses: f64,
    pub net: f64,
}

pub fn totals<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Totals {
    let mut totals = Totals::default();
    for tx in transactions {
        if tx.is_income() {
            totals.income += tx.amount;
        } else if tx.is_expense() {
            totals.expenses += tx.amount;
        }
    }
    totals.net = totals.income + totals.expenses;
    totals
}

/// Signed sum per category
pub fn category_totals<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for tx in transactions {
        *totals.entry(tx.category.clone()).or_insert(0.0) += tx.amount;
    }
    totals
}

/// A selected month compared with the previous month and the same month last year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub month: MonthKey,
    pub previous_month: MonthKey,
    pub previous_year: MonthKey,
    /// Current expenses minus previous month's expenses
    pub month_over_month: f64,
    /// Current expenses minus same month last year
    pub year_over_year: f64,
    /// Current net minus previous month's net
    pub net_change: f64,
}

pub fn compare(transactions: &[Transaction], month: MonthKey) -> Comparison {
    let month_totals = |key: MonthKey| totals(transactions.iter().filter(|tx| key.contains(tx.date)));

    let previous_month = month.previous();
    let previous_year = month.previous_year();
    let current = month_totals(month);
    let prev_month = month_totals(previous_month);
    let prev_year = month_totals(previous_year);

    Comparison {
        month,
        previous_month,
        previous_year,
        month_over_month: current.expenses - prev_month.expenses,
        year_over_year: current.expenses - prev_year.expenses,
        net_change: current.net - prev_month.net,
    }
}

/// A single notable transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
}

impl From<&Transaction> for Highlight {
    fn from(tx: &Transaction) -> Self {
        Self {
            date: tx.date,
            description: tx.description.clone(),
            amount: tx.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub largest_expense: Option<Highlight>,
    pub largest_income: Option<Highlight>,
    /// Category with the most negative expense total
    pub top_category: Option<CategoryTotal>,
    /// Expenses spread over a fixed number of days, as a non-positive number
    pub average_daily_spend: f64,
}

/// Insights over a filtered set; `None` for an empty set
pub fn insights(transactions: &[&Transaction], days_per_period: u32) -> Option<Insights> {
    if transactions.is_empty() {
        return None;
    }

    let expenses: Vec<&Transaction> = transactions
        .iter()
        .copied()
        .filter(|tx| tx.is_expense())
        .collect();

    let largest_expense = expenses
        .iter()
        .min_by(|a, b| a.amount.total_cmp(&b.amount))
        .map(|tx| Highlight::from(*tx));
    let largest_income = transactions
        .iter()
        .filter(|tx| tx.is_income())
        .max_by(|a, b| a.amount.total_cmp(&b.amount))
        .map(|tx| Highlight::from(*tx));

    let top_category = category_totals(expenses.iter().copied())
        .into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(category, total)| CategoryTotal { category, total });

    let spent: f64 = expenses.iter().map(|tx| tx.amount).sum();
    let average = spent.abs() / f64::from(days_per_period.max(1));

    Some(Insights {
        largest_expense,
        largest_income,
        top_category,
        average_daily_spend: if average == 0.0 { 0.0 } else { -average },
    })
}

/// Progress of one category against its budget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub category: String,
    /// Signed category total in the filtered set
    pub spent: f64,
    pub budget: Option<f64>,
    /// 0..=100, 0 when there is no budget
    pub percent: f64,
}

/// Budget progress for each category, in the given order
pub fn budget_status(
    transactions: &[&Transaction],
    categories: &[String],
    budgets: &HashMap<String, f64>,
) -> Vec<BudgetStatus> {
    let totals = category_totals(transactions.iter().copied());

    categories
        .iter()
        .map(|category| {
            let spent = totals.get(category).copied().unwrap_or(0.0);
            let budget = budgets.get(category).copied().filter(|b| *b != 0.0);
            let percent = budget.map_or(0.0, |b| ((spent / b).abs() * 100.0).min(100.0));
            BudgetStatus {
                category: category.clone(),
                spent,
                budget,
                percent,
            }
        })
        .collect()
}

/// Everything the dashboard shows for one filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub month: Option<MonthKey>,
    pub transaction_count: usize,
    pub totals: Totals,
    pub category_totals: BTreeMap<String, f64>,
    pub comparison: Option<Comparison>,
    pub insights: Option<Insights>,
    pub budgets: Vec<BudgetStatus>,
}

pub fn summarize(transactions: &[Transaction], filter: &Filter, config: &Config) -> Summary {
    let filtered = filter.apply(transactions);

    Summary {
        month: filter.month,
        transaction_count: filtered.len(),
        totals: totals(filtered.iter().copied()),
        category_totals: category_totals(filtered.iter().copied()),
        // Comparisons look at whole months, ignoring category and search
        comparison: filter.month.map(|month| compare(transactions, month)),
        insights: insights(&filtered, config.insights.days_per_period),
        budgets: budget_status(&filtered, &config.classifier.categories, &config.budgets),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: &str, description: &str, amount: f64, category: &str) -> Transaction {
        Transaction {
            date: date.parse().unwrap(),
            description: description.to_string(),
            amount,
            balance: None,
            category: category.to_string(),
            currency: "SEK".to_string(),
            card_holder: None,
        }
    }

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("2024-03-01", "Lön AB", 35000.0, "Inkomst"),
            tx("2024-03-02", "Hyra", -12500.0, "Boende"),
            tx("2024-03-03", "ICA Kvantum", -1850.0, "Mat & dagligvaror"),
            tx("2024-03-05", "SL biljett", -980.0, "Transport"),
            tx("2024-02-02", "Hyra", -12500.0, "Boende"),
            tx("2024-02-03", "ICA Kvantum", -2100.0, "Mat & dagligvaror"),
            tx("2023-03-01", "Lön AB", 32000.0, "Inkomst"),
            tx("2023-03-04", "ICA Kvantum", -1500.0, "Mat & dagligvaror"),
        ]
    }

    #[test]
    fn test_months_sorted_and_latest() {
        let transactions = sample();
        let months = months(&transactions);
        assert_eq!(
            months.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
            vec!["2023-03", "2024-02", "2024-03"]
        );
        assert_eq!(latest_month(&transactions), Some(month("2024-03")));
        assert_eq!(latest_month(&[]), None);
    }

    #[test]
    fn test_filter() {
        let transactions = sample();

        let march = Filter::new().month(Some(month("2024-03")));
        assert_eq!(march.apply(&transactions).len(), 4);

        let food = Filter::new().category(Some("Mat & dagligvaror"));
        assert_eq!(food.apply(&transactions).len(), 3);

        let all = Filter::new().category(Some("all"));
        assert_eq!(all.apply(&transactions).len(), transactions.len());

        let search = Filter::new().search(Some("  KVANTUM "));
        assert_eq!(search.apply(&transactions).len(), 3);

        let combined = Filter::new()
            .month(Some(month("2024-02")))
            .search(Some("ica"));
        let found = combined.apply(&transactions);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].amount, -2100.0);
    }

    #[test]
    fn test_totals() {
        let transactions = sample();
        let march = Filter::new().month(Some(month("2024-03"))).apply(&transactions);
        let totals = totals(march.iter().copied());
        assert_eq!(totals.income, 35000.0);
        assert_eq!(totals.expenses, -15330.0);
        assert_eq!(totals.net, 19670.0);
    }

    #[test]
    fn test_zero_amount_is_neither_income_nor_expense() {
        let transactions = vec![tx("2024-03-01", "Noll", 0.0, "Övrigt")];
        assert_eq!(totals(&transactions), Totals::default());
    }

    #[test]
    fn test_category_totals_are_signed() {
        let transactions = vec![
            tx("2024-03-01", "Coop", -100.0, "Mat"),
            tx("2024-03-02", "Coop retur", 30.0, "Mat"),
        ];
        let totals = category_totals(&transactions);
        assert_eq!(totals["Mat"], -70.0);
    }

    #[test]
    fn test_compare() {
        let comparison = compare(&sample(), month("2024-03"));
        assert_eq!(comparison.previous_month, month("2024-02"));
        assert_eq!(comparison.previous_year, month("2023-03"));
        // -15330 - (-14600)
        assert_eq!(comparison.month_over_month, -730.0);
        // -15330 - (-1500)
        assert_eq!(comparison.year_over_year, -13830.0);
        // 19670 - (-14600)
        assert_eq!(comparison.net_change, 34270.0);
    }

    #[test]
    fn test_compare_wraps_january() {
        let transactions = vec![
            tx("2024-01-10", "Coop", -100.0, "Mat"),
            tx("2023-12-10", "Coop", -40.0, "Mat"),
        ];
        let comparison = compare(&transactions, month("2024-01"));
        assert_eq!(comparison.previous_month, month("2023-12"));
        assert_eq!(comparison.month_over_month, -60.0);
    }

    #[test]
    fn test_insights() {
        let transactions = sample();
        let march = Filter::new().month(Some(month("2024-03"))).apply(&transactions);
        let insights = insights(&march, 30).unwrap();

        assert_eq!(insights.largest_expense.unwrap().description, "Hyra");
        assert_eq!(insights.largest_income.unwrap().amount, 35000.0);
        let top = insights.top_category.unwrap();
        assert_eq!(top.category, "Boende");
        assert_eq!(top.total, -12500.0);
        assert_eq!(insights.average_daily_spend, -511.0);
    }

    #[test]
    fn test_insights_edge_cases() {
        assert_eq!(insights(&[], 30), None);

        let income_only = vec![tx("2024-03-01", "Lön", 100.0, "Inkomst")];
        let refs: Vec<&Transaction> = income_only.iter().collect();
        let insights = insights(&refs, 30).unwrap();
        assert_eq!(insights.largest_expense, None);
        assert_eq!(insights.top_category, None);
        assert_eq!(insights.average_daily_spend, 0.0);
        assert!(insights.average_daily_spend.is_sign_positive());
    }

    #[test]
    fn test_budget_status() {
        let transactions = sample();
        let march = Filter::new().month(Some(month("2024-03"))).apply(&transactions);
        let categories = vec!["Boende".to_string(), "Mat & dagligvaror".to_string(), "Barn".to_string()];
        let budgets = HashMap::from([
            ("Boende".to_string(), 10000.0),
            ("Mat & dagligvaror".to_string(), 3700.0),
        ]);

        let status = budget_status(&march, &categories, &budgets);
        assert_eq!(status.len(), 3);
        // Over budget is capped at 100
        assert_eq!(status[0].percent, 100.0);
        assert_eq!(status[1].spent, -1850.0);
        assert_eq!(status[1].percent, 50.0);
        assert_eq!(status[2].budget, None);
        assert_eq!(status[2].spent, 0.0);
        assert_eq!(status[2].percent, 0.0);
    }

    #[test]
    fn test_summarize() {
        let transactions = sample();
        let filter = Filter::new().month(Some(month("2024-03")));
        let summary = summarize(&transactions, &filter, &Config::default());

        assert_eq!(summary.transaction_count, 4);
        assert_eq!(summary.totals.net, 19670.0);
        assert!(summary.comparison.is_some());
        assert!(summary.insights.is_some());
        assert_eq!(summary.budgets.len(), Config::default().classifier.categories.len());

        let unfiltered = summarize(&transactions, &Filter::new(), &Config::default());
        assert!(unfiltered.comparison.is_none());
    }
}
