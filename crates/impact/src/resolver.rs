//! Affected Zone Resolution

use serde::Serialize;
use serde_json::Value;
use severity::SeverityLevel;
use tracing::debug;

use crate::zone::{Vulnerability, Zone};

/// Selects the zones affected at a given severity.
///
/// Inclusion depends only on `(severity, vulnerability)`, so the affected set
/// can only grow as severity increases.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactResolver;

impl ImpactResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }

    /// Whether a zone with this vulnerability is affected at `severity`
    pub fn is_affected(severity: SeverityLevel, vulnerability: Vulnerability) -> bool {
        match severity {
            SeverityLevel::Safe => false,
            SeverityLevel::Moderate => vulnerability == Vulnerability::High,
            SeverityLevel::High | SeverityLevel::Extreme => true,
        }
    }

    /// Filter `zones`, preserving their order
    pub fn resolve<'a>(&self, zones: &'a [Zone], severity: SeverityLevel) -> Vec<&'a Zone> {
        let affected: Vec<&Zone> = zones
            .iter()
            .filter(|zone| Self::is_affected(severity, zone.vulnerability()))
            .collect();

        debug!(
            "Severity {} affects {} of {} zones",
            severity,
            affected.len(),
            zones.len()
        );
        affected
    }
}

/// GeoJSON FeatureCollection of affected zones
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Value>,
}

impl FeatureCollection {
    /// Collect zone features into a FeatureCollection, unmodified
    pub fn from_zones(zones: &[&Zone]) -> Self {
        Self {
            kind: "FeatureCollection",
            features: zones.iter().map(|zone| zone.feature().clone()).collect(),
        }
    }

    /// Features in the collection
    pub fn features(&self) -> &[Value] {
        &self.features
    }
}
