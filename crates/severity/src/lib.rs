//! Hazard Severity Levels
//!
//! Shared severity tiers used by the classifier, impact resolution and advisories.
//! Kept in its own crate so every stage of the pipeline agrees on the ordering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors converting raw values into a severity level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeverityError {
    #[error("Severity index {0} is outside 0..=3")]
    OutOfRange(i64),
}

/// Discrete hazard tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SeverityLevel {
    /// Normal conditions
    Safe = 0,
    /// Localised waterlogging possible
    Moderate = 1,
    /// Shoreline flooding likely
    High = 2,
    /// Evacuation-level hazard
    Extreme = 3,
}

impl SeverityLevel {
    /// Number of severity tiers (size of a classifier's output distribution)
    pub const COUNT: usize = 4;

    /// All levels in ascending order
    pub const ALL: [SeverityLevel; Self::COUNT] = [
        SeverityLevel::Safe,
        SeverityLevel::Moderate,
        SeverityLevel::High,
        SeverityLevel::Extreme,
    ];

    /// Numeric index (0 = Safe .. 3 = Extreme)
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Look up a level from a raw index, `None` when out of range
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(SeverityLevel::Safe),
            1 => Some(SeverityLevel::Moderate),
            2 => Some(SeverityLevel::High),
            3 => Some(SeverityLevel::Extreme),
            _ => None,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Safe => "safe",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::High => "high",
            SeverityLevel::Extreme => "extreme",
        }
    }
}

impl From<SeverityLevel> for u8 {
    fn from(level: SeverityLevel) -> Self {
        level.index()
    }
}

impl TryFrom<u8> for SeverityLevel {
    type Error = SeverityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value as i64).ok_or(SeverityError::OutOfRange(value as i64))
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
