//! Prediction confidence values
//!
//! The analytics API is inconsistent about how it reports confidence: some
//! responses carry a number on a 0-100 scale, some a `[0, 1]` fraction, and
//! some a percent-formatted string such as `"85%"`. [`RawConfidence`] keeps
//! whatever arrived on the wire, and [`RawConfidence::normalize`] turns it into
//! a [`NormalizedConfidence`] percentage or reports it invalid.
//!
//! # Known limitation
//!
//! Values at or below `1` are treated as fractions and scaled by 100, so a
//! genuine confidence of 1% cannot be told apart from a fractional `0.01`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Confidence exactly as reported by the API
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawConfidence {
    /// A JSON number, either a fraction or a percentage
    Number(f64),
    /// A string, usually percent-formatted (`"85%"`)
    Text(String),
    /// Absent, `null`, or a JSON type that cannot carry a confidence
    #[default]
    Missing,
}

/// Confidence percentage in the closed range `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct NormalizedConfidence(f64);

impl NormalizedConfidence {
    /// Lower bound of the valid range
    pub const MIN: f64 = 0.0;
    /// Upper bound of the valid range
    pub const MAX: f64 = 100.0;

    /// Apply the fraction heuristic and range check to a numeric confidence
    ///
    /// Returns `None` for `NaN` and for anything outside `[0, 100]` after
    /// scaling.
    pub fn from_raw_value(value: f64) -> Option<Self> {
        if value.is_nan() {
            return None;
        }

        let scaled = if value <= 1.0 { value * 100.0 } else { value };

        (Self::MIN..=Self::MAX).contains(&scaled).then_some(Self(scaled))
    }

    /// The percentage value
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for NormalizedConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl RawConfidence {
    /// Normalize to a percentage, or `None` if the value is invalid
    ///
    /// Strings have surrounding whitespace and one trailing `%` removed and
    /// must then parse as a float.
    pub fn normalize(&self) -> Option<NormalizedConfidence> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(text) => parse_percent(text)?,
            Self::Missing => return None,
        };

        NormalizedConfidence::from_raw_value(value)
    }

    /// Whether this value normalizes to a valid percentage
    pub fn is_valid(&self) -> bool {
        self.normalize().is_some()
    }

    /// Build from an arbitrary JSON value
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map_or(Self::Missing, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            _ => Self::Missing,
        }
    }
}

fn parse_percent(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    digits.parse::<f64>().ok()
}

impl From<f64> for RawConfidence {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawConfidence {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawConfidence {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Serialize for RawConfidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for RawConfidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}
