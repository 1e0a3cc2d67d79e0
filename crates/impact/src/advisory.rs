//! Advisory Catalogue

use severity::SeverityLevel;

const SAFE: &[&str] = &["All clear. Normal operations."];

const MODERATE: &[&str] = &[
    "Waterlogging possible on low-lying roads.",
    "Fisherfolk: check harbor conditions.",
];

const HIGH: &[&str] = &[
    "Shoreline flooding likely.",
    "Close schools in coastal ward.",
    "Suspend small craft operations.",
];

const EXTREME: &[&str] = &[
    "Evacuate low-lying areas.",
    "Close coastal roads.",
    "Activate shelters.",
];

/// Static guidance per severity level
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvisoryCatalogue;

impl AdvisoryCatalogue {
    /// Guidance for a severity level
    pub fn advisories_for(severity: SeverityLevel) -> &'static [&'static str] {
        match severity {
            SeverityLevel::Safe => SAFE,
            SeverityLevel::Moderate => MODERATE,
            SeverityLevel::High => HIGH,
            SeverityLevel::Extreme => EXTREME,
        }
    }

    /// Guidance for a raw severity index; anything outside 0..=3 gets the Safe set
    pub fn advisories_for_index(index: i64) -> &'static [&'static str] {
        SeverityLevel::from_index(index)
            .map(Self::advisories_for)
            .unwrap_or(SAFE)
    }
}
