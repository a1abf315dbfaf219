//! Row ingestion from delimited text into typed [`crate::record::MftRecord`]s
//!
//! One streaming pass over an MFT CSV export, header-keyed so the loader is
//! robust to column reordering between converter versions. Malformed rows and
//! failed field coercions are recovered locally and surfaced as warnings in
//! the [`LoadReport`]; only source unavailability, a missing header column,
//! or cancellation fails the load.

pub mod error;
pub mod reader;

pub use error::IngestError;
pub use reader::{LoadProgress, LoadReport, Loader, RowWarning};
