//! # PLC Value Types
//!
//! Typed values produced from raw PLCComS strings, and the zero/empty
//! suppression policy applied before results are published.

use std::fmt;

use serde::Serialize;

use crate::constants::NO_DATA_SENTINEL;

/// A variable value after normalization.
///
/// The server transmits every value as text. [`PlcValue::parse`] is the only
/// place that decides the type, with this precedence:
///
/// | Raw text | Result |
/// |----------|--------|
/// | exactly `true` / `false` (any case, no padding) | `Bool` |
/// | contains `.` and parses as float (surrounding whitespace ignored) | `Float` |
/// | parses as integer (surrounding whitespace ignored) | `Int` |
/// | anything else | `String` (unchanged) |
///
/// # Example
///
/// ```rust
/// use plccoms::PlcValue;
///
/// assert_eq!(PlcValue::parse("TRUE"), PlcValue::Bool(true));
/// assert_eq!(PlcValue::parse("21.5"), PlcValue::Float(21.5));
/// assert_eq!(PlcValue::parse("-7"), PlcValue::Int(-7));
/// assert_eq!(PlcValue::parse("1.2.3"), PlcValue::String("1.2.3".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlcValue {
    /// Boolean (`true`/`false`)
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Anything that is not one of the above
    String(String),
}

impl PlcValue {
    /// Parse a raw protocol value. Never fails.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            return PlcValue::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return PlcValue::Bool(false);
        }

        let trimmed = raw.trim();

        if trimmed.contains('.') {
            if let Ok(v) = trimmed.parse::<f64>() {
                return PlcValue::Float(v);
            }
        } else if let Ok(v) = trimmed.parse::<i64>() {
            return PlcValue::Int(v);
        }

        PlcValue::String(raw.to_string())
    }

    /// Whether the value counts as "no data" for the `ignore_zero` option.
    ///
    /// Numeric zero, blank strings and the literal `"0"` / `"0.000000"`
    /// strings qualify. Booleans never do, `false` is a real reading.
    #[inline]
    pub fn is_zero_or_empty(&self) -> bool {
        match self {
            PlcValue::Bool(_) => false,
            PlcValue::Int(v) => *v == 0,
            PlcValue::Float(v) => *v == 0.0,
            PlcValue::String(s) => s.trim().is_empty() || s == "0" || s == NO_DATA_SENTINEL,
        }
    }

    /// Numeric view, `None` for strings. Booleans map to 0/1.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PlcValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            PlcValue::Int(v) => Some(*v as f64),
            PlcValue::Float(v) => Some(*v),
            PlcValue::String(_) => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PlcValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, PlcValue::Int(_) | PlcValue::Float(_))
    }

    /// Returns the type name as a string for logging/debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            PlcValue::Bool(_) => "bool",
            PlcValue::Int(_) => "int",
            PlcValue::Float(_) => "float",
            PlcValue::String(_) => "string",
        }
    }
}

/// Parse `raw` and apply the suppression policy.
///
/// Returns `None` when `ignore_zero` is set and the value is zero or empty.
pub fn normalize(raw: &str, ignore_zero: bool) -> Option<PlcValue> {
    let value = PlcValue::parse(raw);
    if ignore_zero && value.is_zero_or_empty() {
        None
    } else {
        Some(value)
    }
}

impl fmt::Display for PlcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlcValue::Bool(v) => write!(f, "{}", v),
            PlcValue::Int(v) => write!(f, "{}", v),
            PlcValue::Float(v) => write!(f, "{}", v),
            PlcValue::String(v) => write!(f, "{}", v),
        }
    }
}

// ============================================================================
// From implementations for ergonomic construction
// ============================================================================

impl From<bool> for PlcValue {
    fn from(v: bool) -> Self {
        PlcValue::Bool(v)
    }
}

impl From<i64> for PlcValue {
    fn from(v: i64) -> Self {
        PlcValue::Int(v)
    }
}

impl From<f64> for PlcValue {
    fn from(v: f64) -> Self {
        PlcValue::Float(v)
    }
}

impl From<&str> for PlcValue {
    fn from(v: &str) -> Self {
        PlcValue::String(v.to_string())
    }
}

impl From<String> for PlcValue {
    fn from(v: String) -> Self {
        PlcValue::String(v)
    }
}

// ============================================================================
// Tests
// ============================================================================
