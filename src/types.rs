use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One expense report as it arrives in the JSON payload.
///
/// Kept as a loose JSON object: field values are interpreted one by one by the
/// filler so a bad value degrades that field only.
pub type Record = serde_json::Map<String, serde_json::Value>;

//==============================================================================
// Field Types
//==============================================================================

/// How a mapped header field is interpreted before it is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text, trimmed of surrounding whitespace
    Text,
    /// Calendar date (month-first, then day-first)
    Date,
}

/// Format a number for display, removing unnecessary decimal places
pub fn format_number(n: f64) -> String {
    // Round to 6 decimal places for display (plenty for currency amounts)
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

//==============================================================================
// Planned Writes
//==============================================================================

/// A typed value destined for a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Explicitly cleared cell (value removed, style kept)
    Blank,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "'{}'", s),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Blank => write!(f, "(blank)"),
        }
    }
}

/// A write instruction produced by the filler and applied to a sheet in one batch
#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    /// A1-style coordinate (e.g. "D4")
    pub coord: String,
    pub value: CellValue,
}

impl CellWrite {
    pub fn new(coord: impl Into<String>, value: CellValue) -> Self {
        Self {
            coord: coord.into(),
            value,
        }
    }
}

//==============================================================================
// Validation Log
//==============================================================================

/// Ordered, human-readable notes about every non-default resolution taken
/// while filling one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationLog {
    messages: Vec<String>,
}

impl ValidationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Put a summary line in front of everything logged so far
    pub fn prepend(&mut self, message: impl Into<String>) {
        self.messages.insert(0, message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True if any message contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}
