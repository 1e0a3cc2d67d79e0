//! Impact Mapping
//!
//! Resolves which geographic zones a severity level affects and which
//! guidance strings accompany it.

mod advisory;
mod resolver;
mod zone;

pub use advisory::AdvisoryCatalogue;
pub use resolver::{FeatureCollection, ImpactResolver};
pub use zone::{Vulnerability, Zone, ZoneCatalogue};

use thiserror::Error;

/// Errors loading the zone catalogue
#[derive(Debug, Error)]
pub enum ImpactError {
    #[error("Failed to read zone catalogue: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zone catalogue is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid zone catalogue: {0}")]
    InvalidCatalogue(String),
}
