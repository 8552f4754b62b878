//! Spreadsheet import: cell grids from workbooks or CSV into classified transactions
//!
//! Bank exports arrive as a grid whose first row holds the headers. Cells keep
//! the kind the source gave them (native date, number, text) so dates can be
//! resolved per kind. Parsing is lenient: bad amounts become 0 and bad dates
//! become today, both logged, and neither aborts the batch.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta};
use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::classify::Classifier;
use crate::config::ImportConfig;
use crate::error::{Error, Result};
use crate::models::Transaction;

/// A spreadsheet cell, reduced to the kinds the parser distinguishes
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    /// Empty cells and empty strings carry no value
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Cell rendered as trimmed text, `None` when blank; used for headers
    fn as_text(&self) -> Option<String> {
        let text = match self {
            Self::Empty => return None,
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.to_string(),
        };
        Some(text).filter(|s| !s.is_empty())
    }

    /// Cell rendered as-is, `None` only when empty
    fn as_raw_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Date(d) => Some(d.to_string()),
        }
    }

    /// Numeric value; blank or unparseable cells are 0
    fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) if n.is_finite() => *n + 0.0,
            Self::Text(s) => parse_number(s).unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Self::Empty,
            Data::String(s) => Self::Text(s.clone()),
            Data::Float(f) => Self::Number(*f),
            Data::Int(i) => Self::Number(*i as f64),
            Data::Bool(b) => Self::Text(b.to_string()),
            Data::DateTime(dt) => {
                let serial = dt.as_f64();
                serial_to_date(serial)
                    .map(Self::Date)
                    .unwrap_or(Self::Number(serial))
            }
            Data::DateTimeIso(s) => parse_text_date(s)
                .map(Self::Date)
                .unwrap_or_else(|| Self::Text(s.clone())),
            Data::DurationIso(s) => Self::Text(s.clone()),
        }
    }
}

/// Raw date value by input kind, each with its own conversion
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput<'a> {
    /// Already a calendar date (typed workbook cell)
    Native(NaiveDate),
    /// Spreadsheet serial day count since 1899-12-30
    Serial(f64),
    /// Free text; `.` separators are read as `-`
    Text(&'a str),
    Missing,
}

impl<'a> DateInput<'a> {
    pub fn from_cell(cell: Option<&'a Cell>) -> Self {
        match cell {
            Some(Cell::Date(d)) => Self::Native(*d),
            Some(Cell::Number(n)) => Self::Serial(*n),
            Some(Cell::Text(s)) if !s.trim().is_empty() => Self::Text(s),
            _ => Self::Missing,
        }
    }

    /// Resolve to a date, `None` when the input cannot be read
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Native(d) => Some(*d),
            Self::Serial(n) => serial_to_date(*n),
            Self::Text(s) => parse_text_date(&s.replace('.', "-")),
            Self::Missing => None,
        }
    }
}

/// Convert a spreadsheet serial (days since 1899-12-30, fractional = time of day)
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let offset = TimeDelta::try_milliseconds(millis)?;
    epoch.checked_add_signed(offset).map(|dt| dt.date())
}

/// Parse a date string in the formats bank exports use
fn parse_text_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let date_formats = [
        "%Y-%m-%d", // 2024-03-05
        "%Y/%m/%d", // 2024/03/05
        "%m/%d/%Y", // 03/05/2024
        "%m-%d-%Y", // 03-05-2024 (also 03.05.2024 after separator rewrite)
    ];
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Parse an amount string, handling thousands separators and decimal commas
///
/// Without a dot, commas that only split off groups of exactly three digits
/// (`1,234`, `1,234,567`) are thousands separators; otherwise a single comma
/// is the decimal mark (`-185,50`). With a dot present commas are always
/// thousands separators. Negative zero comes back as `0.0`.
pub fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();

    let decimal_comma =
        cleaned.contains(',') && !cleaned.contains('.') && !is_digit_grouped(&cleaned);
    let cleaned = if decimal_comma {
        cleaned.replace(',', ".")
    } else {
        cleaned.replace(',', "")
    };

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n + 0.0)
}

/// `1,234` style: a 1-3 digit lead followed by comma-separated 3-digit groups
fn is_digit_grouped(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut groups = unsigned.split(',');
    let lead_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    let mut rest = groups.peekable();
    lead_ok
        && rest.peek().is_some()
        && rest.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

/// Result of parsing a grid
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub transactions: Vec<Transaction>,
    /// Data rows dropped because every cell was blank
    pub skipped_rows: usize,
    /// Rows whose date fell back to today
    pub degraded_dates: usize,
}

/// Converts header-led cell grids into classified transactions
pub struct Parser<'a> {
    config: &'a ImportConfig,
    classifier: &'a Classifier,
    today: NaiveDate,
}

impl<'a> Parser<'a> {
    pub fn new(config: &'a ImportConfig, classifier: &'a Classifier) -> Self {
        Self {
            config,
            classifier,
            today: Local::now().date_naive(),
        }
    }

    /// Override the fallback date used for unreadable dates
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Parse rows where `rows[0]` is the header row
    pub fn parse_rows(&self, rows: &[Vec<Cell>]) -> ParseOutcome {
        let Some((header_row, data_rows)) = rows.split_first() else {
            return ParseOutcome::default();
        };
        let headers = header_map(header_row);
        let mut outcome = ParseOutcome::default();

        for (index, row) in data_rows.iter().enumerate() {
            if row.iter().all(Cell::is_blank) {
                outcome.skipped_rows += 1;
                continue;
            }

            let get = |name: &str| headers.get(name).and_then(|&i| row.get(i));
            let first_present = |names: &[String]| {
                names
                    .iter()
                    .filter_map(|name| get(name.as_str()))
                    .find(|cell| !cell.is_blank())
            };

            let date_input = DateInput::from_cell(first_present(&self.config.date_columns));
            let date = match date_input.to_date() {
                Some(date) => date,
                None => {
                    warn!(
                        row = index + 2,
                        input = ?date_input,
                        fallback = %self.today,
                        "Unreadable transaction date, using today"
                    );
                    outcome.degraded_dates += 1;
                    self.today
                }
            };

            let description = self
                .config
                .description_columns
                .iter()
                .filter_map(|name| get(name.as_str()).and_then(Cell::as_raw_text))
                .next()
                .unwrap_or_else(|| self.config.unknown_description.clone());

            let amount = get(self.config.amount_column.as_str()).map_or(0.0, Cell::as_number);
            let balance = get(self.config.balance_column.as_str()).map_or(0.0, Cell::as_number);

            let currency = get(self.config.currency_column.as_str())
                .and_then(Cell::as_raw_text)
                .unwrap_or_else(|| self.config.default_currency.clone());
            let card_holder =
                get(self.config.card_holder_column.as_str()).and_then(Cell::as_raw_text);

            let category = self.classifier.classify(&description, amount).to_string();

            outcome.transactions.push(Transaction {
                date,
                description,
                amount,
                balance: Some(balance),
                category,
                currency,
                card_holder,
            });
        }

        debug!(
            "Parsed {} transactions ({} blank rows, {} degraded dates)",
            outcome.transactions.len(),
            outcome.skipped_rows,
            outcome.degraded_dates
        );
        outcome
    }
}

/// Header name → column index; blank headers are skipped, later duplicates win
fn header_map(header_row: &[Cell]) -> HashMap<String, usize> {
    header_row
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| cell.as_text().map(|name| (name, i)))
        .collect()
}

/// Read the first sheet of a workbook (xlsx, xlsm, xlsb, xls, ods) from memory
pub fn read_workbook_bytes(bytes: Vec<u8>) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Import("Workbook has no sheets".into()))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(Cell::from).collect())
        .collect())
}

/// Read CSV into a cell grid, detecting `;` vs `,` from the header line
pub fn read_csv_rows<R: Read>(mut reader: R) -> Result<Vec<Vec<Cell>>> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;
    // Spreadsheet apps prefix CSV exports with a UTF-8 BOM
    if content.starts_with(b"\xEF\xBB\xBF") {
        content.drain(..3);
    }

    let first_line = content.split(|b| *b == b'\n').next().unwrap_or_default();
    let semicolons = first_line.iter().filter(|b| **b == b';').count();
    let commas = first_line.iter().filter(|b| **b == b',').count();
    let delimiter = if semicolons > commas { b';' } else { b',' };

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_slice());

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::text).collect());
    }
    Ok(rows)
}

/// Read a spreadsheet or CSV file into a cell grid based on its extension
pub fn read_file(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "csv" | "txt" => read_csv_rows(std::fs::File::open(path)?),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook_bytes(std::fs::read(path)?),
        other => Err(Error::Import(format!(
            "Unsupported file type: .{} (expected .xlsx, .xls, .ods or .csv)",
            other
        ))),
    }
}
