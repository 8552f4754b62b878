//! Configuration for classification, import column mapping, budgets and insights
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/famfin/config/famfin.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! The loaded [`Config`] is immutable; components receive the parts they need
//! at construction time.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/famfin.toml");

/// A keyword → category rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
    pub keyword: String,
    pub category: String,
}

impl Rule {
    pub fn new(keyword: &str, category: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            category: category.to_string(),
        }
    }
}

/// Ordered rules plus the known category list and fallback buckets
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub rules: Vec<Rule>,
    pub categories: Vec<String>,
    pub income_category: String,
    pub fallback_category: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let rules = [
            ("lön", "Inkomst"),
            ("salary", "Inkomst"),
            ("hyra", "Boende"),
            ("rent", "Boende"),
            ("ica", "Mat & dagligvaror"),
            ("coop", "Mat & dagligvaror"),
            ("hemköp", "Mat & dagligvaror"),
            ("spotify", "Nöje"),
            ("netflix", "Nöje"),
            ("sl", "Transport"),
            ("sas", "Resor"),
            ("apotek", "Hälsa"),
            ("försäkring", "Hälsa"),
        ]
        .iter()
        .map(|(keyword, category)| Rule::new(keyword, category))
        .collect();

        let categories = [
            "Boende",
            "Mat & dagligvaror",
            "Transport",
            "Nöje",
            "Resor",
            "Barn",
            "Hälsa",
            "Sparande",
            "Inkomst",
            "Övrigt",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();

        Self {
            rules,
            categories,
            income_category: "Inkomst".to_string(),
            fallback_category: "Övrigt".to_string(),
        }
    }
}

/// Spreadsheet header names and defaults used by the parser
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Candidate date headers, first present one wins
    pub date_columns: Vec<String>,
    /// Candidate description headers, first non-empty one wins
    pub description_columns: Vec<String>,
    pub amount_column: String,
    pub balance_column: String,
    pub currency_column: String,
    pub card_holder_column: String,
    pub default_currency: String,
    /// Description used when no description column has a value
    pub unknown_description: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            date_columns: vec!["Transaktionsdatum".into(), "Reskontradatum".into()],
            description_columns: vec!["Text".into(), "Inköpsställe".into()],
            amount_column: "Belopp".into(),
            balance_column: "Saldo".into(),
            currency_column: "Valuta".into(),
            card_holder_column: "Kortinnehavare".into(),
            default_currency: "SEK".into(),
            unknown_description: "Okänd".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Divisor for average daily spend. Fixed rather than derived from the
    /// filtered period.
    pub days_per_period: u32,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            days_per_period: 30,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub classifier: ClassifierConfig,
    pub import: ImportConfig,
    pub insights: InsightsConfig,
    /// Monthly budget per category
    pub budgets: HashMap<String, f64>,
}

impl Config {
    /// Load from an explicit path, the data-dir override, or embedded defaults
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!("Loading config override from {}", path.display());
                    fs::read_to_string(&path).map_err(|e| {
                        Error::Config(format!("Failed to read {}: {}", path.display(), e))
                    })?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    /// Budget for a category, `None` when unset or zero
    pub fn budget_for(&self, category: &str) -> Option<f64> {
        self.budgets.get(category).copied().filter(|b| *b != 0.0)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("famfin").join("config").join("famfin.toml"))
}

/// Parse and validate config from TOML content
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    if let Some(rule) = config
        .classifier
        .rules
        .iter()
        .find(|r| r.keyword.trim().is_empty())
    {
        // An empty keyword is a substring of everything
        return Err(Error::Config(format!(
            "Rule for category '{}' has an empty keyword",
            rule.category
        )));
    }
    if config.insights.days_per_period == 0 {
        return Err(Error::Config(
            "insights.days_per_period must be greater than zero".into(),
        ));
    }
    if config.import.date_columns.is_empty() {
        return Err(Error::Config("import.date_columns must not be empty".into()));
    }

    Ok(config)
}
