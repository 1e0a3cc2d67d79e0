//! Storage Layer
//!
//! Historical observation records loaded once at startup from CSV and served
//! as a trailing window for charting.

mod repository;

pub use repository::{HistoryRecord, HistoryStore, DEFAULT_MAX_RECORDS};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read history: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed history at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}
