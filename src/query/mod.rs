//! Composable multi-criteria filtering over a record store
//!
//! A [`FilterSet`] describes the active criteria, one entry per category;
//! [`execute`] validates it, compiles it, and evaluates it against an
//! immutable [`crate::store::RecordStore`] snapshot, returning an ordered
//! [`QueryResult`]. The timeline-anomaly detector lives here too, exposed as
//! one more attribute toggle so it composes like every other filter.

pub mod anomaly;
pub mod error;
pub mod executor;
pub mod predicates;
pub mod types;

pub use anomaly::is_timeline_anomaly;
pub use error::FilterError;
pub use executor::{QueryResult, QuerySession, execute};
pub use predicates::CompiledFilter;
pub use types::{AttributeToggles, DateFilter, FilterSet, SizeRange};
