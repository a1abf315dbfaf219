//! Ingestion error types
//!
//! Only load-fatal conditions live here: an unreadable source, a header that
//! does not carry the expected columns, or an explicit cancellation. Row- and
//! field-level problems are recovered locally and reported as
//! [`super::RowWarning`] values in the load report instead.

use thiserror::Error;

/// Fatal load errors
#[derive(Debug, Error)]
pub enum IngestError {
    /// The input source could not be opened or became unreadable mid-stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV stream itself is broken (not a single bad row)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing from the header row
    #[error("required column '{0}' missing from header")]
    MissingColumn(&'static str),

    /// The load was cancelled via the cancel flag; partial data is discarded
    #[error("load aborted")]
    Aborted,
}
