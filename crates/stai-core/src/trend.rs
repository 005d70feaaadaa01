//! Trend labels
//!
//! Sources disagree on spelling and case ("bullish", "Bullish", "up"), so
//! labels are classified case-insensitively into a small closed set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
    Unknown,
}

const BULLISH: &[&str] = &["bullish", "up"];
const BEARISH: &[&str] = &["bearish", "down"];
const NEUTRAL: &[&str] = &["neutral", "flat", "sideways"];

impl Trend {
    /// Classify a raw trend label
    pub fn classify(label: &str) -> Self {
        let label = label.trim();
        let matches = |set: &[&str]| set.iter().any(|s| s.eq_ignore_ascii_case(label));

        if matches(BULLISH) {
            Self::Bullish
        } else if matches(BEARISH) {
            Self::Bearish
        } else if matches(NEUTRAL) {
            Self::Neutral
        } else {
            Self::Unknown
        }
    }

    /// Classify an optional label; absent labels are `Unknown`
    pub fn classify_opt(label: Option<&str>) -> Self {
        label.map_or(Self::Unknown, Self::classify)
    }

    pub fn is_bullish(self) -> bool {
        self == Self::Bullish
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bullish => "Bullish",
            Self::Bearish => "Bearish",
            Self::Neutral => "Neutral",
            Self::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}
