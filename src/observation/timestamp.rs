//! Opaque instant identifiers.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An opaque, totally ordered instant identifier.
///
/// Collectors emit either numbers (epoch-based, possibly fractional) or
/// strings (formatted datetimes). Equality is exact: two timestamps that
/// denote the same moment in different notations are different instants, so
/// `1` and `1.0` are distinct.
///
/// # Ordering
///
/// Numeric timestamps sort before all text timestamps. Numbers compare by
/// value, integers against fractional values through `f64`; when an integer
/// and a fractional value are numerically equal the integer sorts first.
/// Text compares lexicographically, so ISO-8601 text sorts chronologically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Whole-number instant (e.g. Unix seconds).
    Integer(i64),
    /// Fractional or out-of-`i64`-range numeric instant (e.g. `1714564800.5`).
    Float(f64),
    /// Textual instant (e.g. `2024-05-01 12:00:00.000000`).
    Text(String),
}

impl Timestamp {
    /// Parses user input into a timestamp.
    ///
    /// Input that is a valid `i64` becomes [`Timestamp::Integer`], a finite
    /// decimal number becomes [`Timestamp::Float`]; anything else is kept as
    /// [`Timestamp::Text`] without interpretation.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::Integer(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Float(value),
            _ => Self::Text(input.to_string()),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) | Self::Float(_) => 0,
            Self::Text(_) => 1,
        }
    }
}

// Precision loss only matters beyond 2^53, far past any epoch timestamp.
#[allow(clippy::cast_precision_loss)]
fn compare_mixed(integer: i64, float: f64) -> Ordering {
    (integer as f64).total_cmp(&float).then(Ordering::Less)
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Integer(a), Self::Float(b)) => compare_mixed(*a, *b),
            (Self::Float(a), Self::Integer(b)) => compare_mixed(*b, *a).reverse(),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Integer(value) => (0u8, value).hash(state),
            Self::Float(value) => (1u8, value.to_bits()).hash(state),
            Self::Text(value) => (2u8, value).hash(state),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            // Debug keeps the fractional part (`3.0`), so the text parses back to the same instant
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Timestamp {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
