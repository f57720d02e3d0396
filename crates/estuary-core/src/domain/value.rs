use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};

/// Marker emitted for values with no predecessor or no upstream reading.
pub const NOT_AVAILABLE: &str = "N/A";

/// Scalar cell of a canonical document.
///
/// `NotAvailable` is an explicit marker, never a numeric zero; it serializes
/// as the literal string `"N/A"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Int(i64),
    Text(String),
    NotAvailable,
}

impl Scalar {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Number(value) => serializer.serialize_f64(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Text(value) => serializer.serialize_str(value),
            Self::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage change of `current` against `previous`, rounded to two
/// decimals.
pub fn pct_change(current: f64, previous: f64) -> f64 {
    round2(100.0 * (current / previous - 1.0))
}
