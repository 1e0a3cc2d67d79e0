//! Zone Catalogue

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::ImpactError;

/// Per-zone sensitivity to flooding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vulnerability {
    Low,
    Med,
    High,
}

impl Vulnerability {
    /// Parse a catalogue tag. Anything other than `low`/`high` counts as `med`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "high" => Vulnerability::High,
            "low" => Vulnerability::Low,
            _ => Vulnerability::Med,
        }
    }
}

/// A GeoJSON feature plus its vulnerability tag.
///
/// The feature is kept verbatim so responses echo it unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    feature: Value,
    vulnerability: Vulnerability,
}

impl Zone {
    /// Wrap a GeoJSON feature, reading `properties.vulnerability` (default `med`)
    pub fn from_feature(feature: Value) -> Self {
        let vulnerability = feature
            .get("properties")
            .and_then(|p| p.get("vulnerability"))
            .and_then(Value::as_str)
            .map(Vulnerability::from_tag)
            .unwrap_or(Vulnerability::Med);

        Self { feature, vulnerability }
    }

    /// The source GeoJSON feature
    pub fn feature(&self) -> &Value {
        &self.feature
    }

    /// Vulnerability tag
    pub fn vulnerability(&self) -> Vulnerability {
        self.vulnerability
    }

    /// `properties.name`, if present
    pub fn name(&self) -> Option<&str> {
        self.feature
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
    }
}

/// Read-only zone catalogue loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct ZoneCatalogue {
    zones: Vec<Zone>,
}

impl ZoneCatalogue {
    /// Catalogue with no zones
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from already-parsed zones
    pub fn from_zones(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// Parse a GeoJSON FeatureCollection. A collection without `features` is empty.
    pub fn from_geojson_str(raw: &str) -> Result<Self, ImpactError> {
        let root: Value = serde_json::from_str(raw)?;

        let Some(object) = root.as_object() else {
            return Err(ImpactError::InvalidCatalogue(
                "top level must be a GeoJSON object".to_string(),
            ));
        };

        let features = match object.get("features") {
            None => return Ok(Self::empty()),
            Some(Value::Array(features)) => features,
            Some(_) => {
                return Err(ImpactError::InvalidCatalogue(
                    "`features` must be an array".to_string(),
                ))
            }
        };

        let mut zones = Vec::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            if !feature.is_object() {
                return Err(ImpactError::InvalidCatalogue(format!(
                    "feature {} is not an object",
                    idx
                )));
            }
            zones.push(Zone::from_feature(feature.clone()));
        }

        debug!("Parsed {} zones", zones.len());
        Ok(Self { zones })
    }

    /// Load from a GeoJSON file. A missing file yields an empty catalogue.
    pub fn load(path: &Path) -> Result<Self, ImpactError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Zone catalogue {} not found, no zones loaded", path.display());
                return Ok(Self::empty());
            }
            Err(e) => return Err(e.into()),
        };

        let catalogue = Self::from_geojson_str(&raw)?;
        info!("Loaded {} zones from {}", catalogue.len(), path.display());
        Ok(catalogue)
    }

    /// All zones in catalogue order
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Number of zones
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Check if catalogue is empty
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
