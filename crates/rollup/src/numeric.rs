//! Numeric normalization for API-supplied amounts.
//!
//! Upstream values arrive as JSON numbers, numeric strings with arbitrary
//! thousands separators, or `null`. Everything collapses to a finite `f64`;
//! anything unparseable is 0.

use serde::{Deserialize, Serialize};

/// A number as the API hands it over.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumberLike {
    Number(f64),
    Text(String),
    /// Booleans, objects, arrays. Normalizes to 0.
    Other(serde_json::Value),
}

impl From<f64> for NumberLike {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NumberLike {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Which character separates the fractional part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalStyle {
    /// The last `,` or `.` in the string is the decimal point.
    /// `"1,234"` therefore reads as 1.234.
    #[default]
    LastSeparator,
    /// `.` is the decimal point; `,` is grouping.
    Dot,
    /// `,` is the decimal point; `.` is grouping.
    Comma,
}

impl std::fmt::Display for DecimalStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastSeparator => write!(f, "last_separator"),
            Self::Dot => write!(f, "dot"),
            Self::Comma => write!(f, "comma"),
        }
    }
}

/// Parse a numeric string such as `"1 234,56"` or `"12_345.50"`.
///
/// Returns `None` for blank or digitless input.
pub fn parse_number_str(raw: &str, style: DecimalStyle) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let boundary = match style {
        DecimalStyle::LastSeparator => trimmed.rfind(|c| c == ',' || c == '.'),
        DecimalStyle::Dot => trimmed.rfind('.'),
        DecimalStyle::Comma => trimmed.rfind(','),
    };

    let (int_part, frac_part) = match boundary {
        Some(i) => (&trimmed[..i], &trimmed[i + 1..]),
        None => (trimmed, ""),
    };

    let mut cleaned = String::with_capacity(trimmed.len());
    if int_part.starts_with('-') {
        cleaned.push('-');
    }
    cleaned.extend(int_part.chars().filter(|c| c.is_ascii_digit()));

    let fraction: String = frac_part.chars().filter(|c| c.is_ascii_digit()).collect();
    if !fraction.is_empty() {
        cleaned.push('.');
        cleaned.push_str(&fraction);
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl NumberLike {
    /// Normalized value, 0 when unparseable.
    pub fn to_f64(&self, style: DecimalStyle) -> f64 {
        match self {
            Self::Number(n) if n.is_finite() => *n,
            Self::Number(_) => 0.0,
            Self::Text(s) => parse_number_str(s, style).unwrap_or(0.0),
            Self::Other(_) => 0.0,
        }
    }

    /// Blank strings and JSON `null` carry no value.
    fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Other(v) => v.is_null(),
            Self::Number(_) => false,
        }
    }
}

/// Normalize an optional API value, defaulting to 0.
pub fn normalize(value: Option<&NumberLike>, style: DecimalStyle) -> f64 {
    value.map(|v| v.to_f64(style)).unwrap_or(0.0)
}

/// Normalize while keeping presence: absent or blank input is `None`,
/// present-but-garbage input is `Some(0.0)`.
pub fn normalize_present(value: Option<&NumberLike>, style: DecimalStyle) -> Option<f64> {
    match value {
        Some(v) if !v.is_blank() => Some(v.to_f64(style)),
        _ => None,
    }
}
