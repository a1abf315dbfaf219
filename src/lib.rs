//! Mftsift - an in-memory filter and triage engine for NTFS $MFT CSV exports
//!
//! This library loads an MFT CSV export into an immutable, indexed record
//! store and runs composable multi-criteria queries over it: text search,
//! wildcard name matching, extension sets, size and date ranges, attribute
//! toggles, and a timestomp-style timeline-anomaly detector.

use thiserror::Error;

pub mod analysis;
pub mod cli;
pub mod ingest;
pub mod output;
pub mod query;
pub mod record;
pub mod store;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum MftSiftError {
    /// Ingestion error
    #[error("Load error: {0}")]
    IngestError(#[from] ingest::IngestError),
    /// Filter validation error
    #[error("Filter error: {0}")]
    FilterError(#[from] query::FilterError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
