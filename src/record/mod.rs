//! Typed model for one loaded $MFT table
//!
//! Records are produced by [`crate::ingest`], frozen into a
//! [`crate::store::RecordStore`], and only ever read after that. All
//! timestamp fields are independently nullable; see [`Timestamps`].

pub mod types;

pub use types::{MftRecord, TimestampKind, TimestampSource, Timestamps};
