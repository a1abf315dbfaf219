//! Filter configuration error types
//!
//! These cover internally inconsistent criteria supplied by the caller. They
//! are surfaced by [`crate::query::FilterSet::validate`] before any query
//! runs; an empty result set is never an error.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::record::TimestampKind;

/// Invalid filter criteria, detected before execution
#[derive(Debug, Error)]
pub enum FilterError {
    /// Size range with min above max; never silently swapped
    #[error("invalid size range: min {min} exceeds max {max}")]
    InvalidSizeRange { min: u64, max: u64 },

    /// Date range with from after to
    #[error("invalid {kind} date range: {from} is after {to}")]
    InvalidDateRange {
        kind: TimestampKind,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    /// More than one date filter for the same timestamp kind
    #[error("duplicate date filter for {0} timestamps")]
    DuplicateDateFilter(TimestampKind),

    /// The name pattern is not a valid wildcard expression
    #[error("invalid name pattern '{pattern}': {source}")]
    InvalidNamePattern {
        pattern: String,
        source: glob::PatternError,
    },
}
