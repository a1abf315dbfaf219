//! Query execution against an immutable record store
//!
//! The executor picks the cheapest entry set first: when an indexed category
//! is active (extension set or a flag toggle) it starts from the smallest
//! index-derived candidate list and intersects the rest narrowest-first,
//! then evaluates the remaining predicates over the survivors with a
//! parallel, order-preserving scan. With no index active it scans the whole
//! sequence. Results always come back in load order, so identical inputs
//! produce identical output.
//!
//! Execution only reads the store, so any number of queries may run
//! concurrently against the same `Arc` snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;

use super::error::FilterError;
use super::predicates::CompiledFilter;
use super::types::FilterSet;
use crate::record::MftRecord;
use crate::store::{AttributeFlag, RecordStore};

/// Ordered match list over one store snapshot, plus summary counts
///
/// A result owns its snapshot: replacing the store with a fresh load does
/// not invalidate results already handed to the presentation layer. Results
/// are replaced wholesale on every filter change, never mutated.
#[derive(Debug, Clone)]
pub struct QueryResult {
    snapshot: Arc<RecordStore>,
    positions: Vec<u32>,
}

impl QueryResult {
    /// Number of records in the store the query ran against
    #[must_use]
    pub fn total(&self) -> usize {
        self.snapshot.len()
    }

    /// Number of matching records
    #[must_use]
    pub fn matched(&self) -> usize {
        self.positions.len()
    }

    /// Matching positions in the store, ascending (load order)
    #[must_use]
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    /// The store snapshot this result was computed against
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.snapshot
    }

    /// Matching records in load order
    pub fn iter(&self) -> impl Iterator<Item = &MftRecord> {
        self.positions
            .iter()
            .filter_map(|&position| self.snapshot.get(position as usize))
    }
}

/// Run `filters` against `store`, producing an ordered result
///
/// An empty match list is a normal outcome, not an error.
///
/// # Errors
/// Returns `FilterError` when the filter set is internally inconsistent;
/// the query is not run in that case.
pub fn execute(store: &Arc<RecordStore>, filters: &FilterSet) -> Result<QueryResult, FilterError> {
    let compiled = CompiledFilter::compile(filters)?;

    let positions = match candidate_positions(store, filters) {
        Some(candidates) => candidates
            .into_par_iter()
            .filter(|&position| {
                store
                    .get(position as usize)
                    .is_some_and(|record| compiled.matches_residual(record))
            })
            .collect(),
        None => (0..store.len() as u32)
            .into_par_iter()
            .filter(|&position| {
                store
                    .get(position as usize)
                    .is_some_and(|record| compiled.matches(record))
            })
            .collect(),
    };

    Ok(QueryResult {
        snapshot: Arc::clone(store),
        positions,
    })
}

/// Build the entry set from the active indexes, or `None` when no indexed
/// category is active and the full sequence must be scanned
///
/// Candidate lists are intersected smallest-first; every input list is
/// ascending, so the intersection stays in load order.
fn candidate_positions(store: &RecordStore, filters: &FilterSet) -> Option<Vec<u32>> {
    let mut index_sets: Vec<Vec<u32>> = Vec::new();

    if !filters.extensions.is_empty() {
        // Union of the per-extension position lists (OR within the category).
        // The lists are disjoint, so concatenate-and-sort yields a sorted,
        // duplicate-free union.
        let mut union: Vec<u32> = filters
            .extensions
            .iter()
            .filter_map(|ext| {
                store.extension_positions(&ext.trim_start_matches('.').to_lowercase())
            })
            .flatten()
            .copied()
            .collect();
        union.sort_unstable();
        index_sets.push(union);
    }

    let toggles = &filters.toggles;
    for (enabled, flag) in [
        (toggles.directories_only, AttributeFlag::Directory),
        (toggles.deleted_only, AttributeFlag::Deleted),
        (toggles.ads_only, AttributeFlag::HasAds),
        (toggles.cooled_only, AttributeFlag::Cooled),
    ] {
        if enabled {
            index_sets.push(store.flag_positions(flag).to_vec());
        }
    }

    if index_sets.is_empty() {
        return None;
    }

    index_sets.sort_by_key(Vec::len);
    let mut sets = index_sets.into_iter();
    let base = sets.next().unwrap_or_default();
    Some(sets.fold(base, |acc, other| intersect_sorted(&acc, &other)))
}

/// Intersection of two ascending position lists
fn intersect_sorted(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Supersession-based cancellation for rapid filter changes
///
/// Each [`run`](Self::run) takes a generation ticket; when a newer run has
/// started by the time an older one finishes, the older result is discarded
/// (`Ok(None)`). Predicate evaluation is CPU-bound and short, so dropping a
/// stale result is cheaper and simpler than threading cooperative
/// cancellation tokens through the scan.
#[derive(Debug, Default)]
pub struct QuerySession {
    generation: AtomicU64,
}

impl QuerySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a generation ticket for a query about to start
    ///
    /// Taking a ticket supersedes every earlier one.
    #[must_use]
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a finished query holding `ticket` is still the newest
    #[must_use]
    pub fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Execute a query unless it is superseded before completion
    ///
    /// # Errors
    /// Returns `FilterError` for an inconsistent filter set, exactly like
    /// [`execute`].
    pub fn run(
        &self,
        store: &Arc<RecordStore>,
        filters: &FilterSet,
    ) -> Result<Option<QueryResult>, FilterError> {
        let ticket = self.begin();
        let result = execute(store, filters)?;
        if self.is_current(ticket) {
            Ok(Some(result))
        } else {
            Ok(None)
        }
    }
}
