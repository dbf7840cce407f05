//! Best-effort conversion of loosely-typed JSON values
//!
//! Nothing here fails: every outcome is a [`Parsed`] value and the caller
//! decides how to degrade.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Outcome of a best-effort parse
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed<T> {
    /// Parsed successfully
    Value(T),
    /// Nothing to parse (null, blank, or a residue with no digits)
    Empty,
    /// Something was there but could not be interpreted
    Invalid,
}

impl<T> Parsed<T> {
    /// The parsed value, collapsing `Empty` and `Invalid` into `None`
    pub fn value(self) -> Option<T> {
        match self {
            Parsed::Value(v) => Some(v),
            Parsed::Empty | Parsed::Invalid => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Parsed::Empty)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Parsed::Invalid)
    }
}

/// Date-time layouts tried before plain dates; the date component is kept
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Month-before-day (and unambiguous) layouts. `%Y` accepts any digit count,
/// so two-digit years and year-last layouts must be tried before year-first
/// ones or `01/02/24` reads as 0001-02-24.
const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%m.%d.%y",
    "%m.%d.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%Y%m%d",
];

/// Day-before-month layouts, the retry pass
const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%y",
    "%d-%m-%Y",
    "%d.%m.%y",
    "%d.%m.%Y",
];

/// Parse a JSON value into a calendar date.
///
/// Strings are tried month-first, then day-first. JSON has no native date, so
/// an RFC 3339 / ISO-8601 date-time string stands in for one and yields its
/// date component. Any other trailing clock time (`03/15/2024 10:30 AM`) is
/// dropped before the date layouts are tried. Non-string values are `Invalid`.
pub fn parse_date(value: &Value) -> Parsed<NaiveDate> {
    let text = match value {
        Value::Null => return Parsed::Empty,
        Value::String(s) => s.trim(),
        _ => return Parsed::Invalid,
    };
    if text.is_empty() {
        return Parsed::Empty;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Parsed::Value(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Parsed::Value(dt.date());
        }
    }

    let date_part = time_suffix().replace(text, "");
    for formats in [MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS] {
        for fmt in formats {
            if let Ok(date) = NaiveDate::parse_from_str(&date_part, fmt) {
                return Parsed::Value(date);
            }
        }
    }

    Parsed::Invalid
}

/// Trailing clock time such as ` 10:30`, `T10:30Z` or ` 9:05:00 PM`
fn time_suffix() -> &'static Regex {
    static TIME: OnceLock<Regex> = OnceLock::new();
    TIME.get_or_init(|| {
        Regex::new(
            r"(?i)(?:\s+|T)\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:\s*[AP]\.?M\.?)?(?:\s*(?:Z|UTC|GMT|[+-]\d{2}:?\d{2}))?$",
        )
        .expect("time suffix pattern is valid")
    })
}

fn number_noise() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| Regex::new(r"[^0-9.\-]").expect("number noise pattern is valid"))
}

/// Parse a JSON value into a number.
///
/// Strings lose every character other than digits, `.` and `-` first, so
/// `"$1,234.56"` becomes `1234.56`. Residues without digits are `Empty`;
/// residues that still do not convert (`"12.34.56"`) are `Invalid`.
pub fn parse_number(value: &Value) -> Parsed<f64> {
    match value {
        Value::Null => Parsed::Empty,
        Value::Number(n) => n.as_f64().map(Parsed::Value).unwrap_or(Parsed::Invalid),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Parsed::Empty;
            }
            let cleaned = number_noise().replace_all(trimmed, "");
            if matches!(cleaned.as_ref(), "" | "-" | "." | "-." | ".-") {
                return Parsed::Empty;
            }
            match cleaned.parse::<f64>() {
                Ok(n) if n.is_finite() => Parsed::Value(n),
                _ => Parsed::Invalid,
            }
        }
        _ => Parsed::Invalid,
    }
}

/// Parse a JSON value into a whole number (fractions truncate toward zero)
pub fn parse_integer(value: &Value) -> Parsed<i64> {
    match value {
        Value::Null => Parsed::Empty,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Parsed::Value(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => {
                        Parsed::Value(f.trunc() as i64)
                    }
                    _ => Parsed::Invalid,
                }
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Parsed::Invalid;
            }
            trimmed
                .parse::<i64>()
                .map(Parsed::Value)
                .unwrap_or(Parsed::Invalid)
        }
        _ => Parsed::Invalid,
    }
}

/// True for null and whitespace-only strings
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Render a JSON value as cell text, trimmed
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Render a JSON value for a log line (strings unquoted, null as `None`)
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
