//! Keyword rule classifier
//!
//! Descriptions are normalized (lowercase, digits removed, whitespace
//! collapsed) and matched against an ordered rule list. The first rule whose
//! keyword is a substring of the normalized description wins; unmatched
//! inflows go to the income bucket and everything else to the fallback.

use crate::config::{ClassifierConfig, Rule};
use crate::models::Transaction;

/// Normalize free text for matching and grouping
///
/// Lowercases, removes ASCII digits, collapses whitespace runs to a single
/// space and trims.
pub fn normalize_text(value: &str) -> String {
    let stripped: String = value
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rule-based classifier built from an immutable config
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    categories: Vec<String>,
    income_category: String,
    fallback_category: String,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        // Keywords are compared against normalized text, so normalize them the same way
        let rules = config
            .rules
            .iter()
            .map(|r| Rule {
                keyword: normalize_text(&r.keyword),
                category: r.category.clone(),
            })
            .filter(|r| !r.keyword.is_empty())
            .collect();

        Self {
            rules,
            categories: config.categories.clone(),
            income_category: config.income_category.clone(),
            fallback_category: config.fallback_category.clone(),
        }
    }

    /// Classify a description/amount pair. Total: always returns a category.
    pub fn classify(&self, description: &str, amount: f64) -> &str {
        let text = normalize_text(description);

        if let Some(rule) = self.matching_rule(&text) {
            return &rule.category;
        }

        if amount > 0.0 {
            &self.income_category
        } else {
            &self.fallback_category
        }
    }

    pub fn classify_transaction(&self, tx: &Transaction) -> String {
        self.classify(&tx.description, tx.amount).to_string()
    }

    /// First rule matching already-normalized text
    pub fn matching_rule(&self, normalized: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| normalized.contains(&r.keyword))
    }

    /// Known categories in display order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn income_category(&self) -> &str {
        &self.income_category
    }

    pub fn fallback_category(&self) -> &str {
        &self.fallback_category
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}
