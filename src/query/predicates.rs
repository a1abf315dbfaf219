//! Compiled per-record filter predicates
//!
//! [`CompiledFilter`] turns a validated [`FilterSet`] into match-ready form:
//! needles lower-cased once, the wildcard pattern compiled once. Every
//! predicate is a pure function of one record, free of side effects, safe to
//! evaluate in any order and from any thread; the executor relies on this
//! to scan partitions in parallel.

use std::collections::HashSet;

use chrono::Duration;
use glob::Pattern;

use super::anomaly::is_timeline_anomaly;
use super::error::FilterError;
use super::types::{AttributeToggles, DateFilter, FilterSet, SizeRange};
use crate::record::MftRecord;

/// A validated, match-ready filter set
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    quick_search: Option<String>,
    name_pattern: Option<Pattern>,
    extensions: HashSet<String>,
    path_contains: Option<String>,
    size: Option<SizeRange>,
    dates: Vec<DateFilter>,
    toggles: AttributeToggles,
    anomaly_tolerance: Duration,
}

impl CompiledFilter {
    /// Validate and compile a filter set
    ///
    /// # Errors
    /// Returns `FilterError` for the same inconsistencies as
    /// [`FilterSet::validate`].
    pub fn compile(filters: &FilterSet) -> Result<Self, FilterError> {
        filters.validate()?;

        let name_pattern = match &filters.name_pattern {
            // Validated above; compile cannot fail here, but stay on the
            // Result path rather than unwrapping.
            Some(pattern) => Some(Pattern::new(&pattern.to_lowercase()).map_err(|source| {
                FilterError::InvalidNamePattern {
                    pattern: pattern.clone(),
                    source,
                }
            })?),
            None => None,
        };

        Ok(Self {
            quick_search: filters.quick_search.as_ref().map(|s| s.to_lowercase()),
            name_pattern,
            extensions: filters
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            path_contains: filters.path_contains.as_ref().map(|s| s.to_lowercase()),
            size: filters.size,
            dates: filters.dates.clone(),
            toggles: filters.toggles,
            anomaly_tolerance: filters.anomaly_tolerance,
        })
    }

    /// Full composite predicate: AND of every active category
    #[must_use]
    pub fn matches(&self, record: &MftRecord) -> bool {
        self.matches_indexed(record) && self.matches_residual(record)
    }

    /// The categories the store carries indexes for (extension membership
    /// and the four flag toggles). When the executor enters through an index
    /// these are already satisfied by candidate construction.
    #[must_use]
    pub fn matches_indexed(&self, record: &MftRecord) -> bool {
        self.matches_extension(record) && self.matches_flag_toggles(record)
    }

    /// Everything that always needs a scan: text, pattern, size, dates, and
    /// the anomaly toggle
    #[must_use]
    pub fn matches_residual(&self, record: &MftRecord) -> bool {
        self.matches_quick_search(record)
            && self.matches_name_pattern(record)
            && self.matches_path(record)
            && self.matches_size(record)
            && self.matches_dates(record)
            && self.matches_anomaly(record)
    }

    /// Case-insensitive substring over name + parent path
    #[must_use]
    pub fn matches_quick_search(&self, record: &MftRecord) -> bool {
        self.quick_search
            .as_ref()
            .is_none_or(|needle| record.full_path().to_lowercase().contains(needle))
    }

    /// Wildcard match anchored to the whole name; without wildcards this
    /// degenerates to case-insensitive equality
    #[must_use]
    pub fn matches_name_pattern(&self, record: &MftRecord) -> bool {
        self.name_pattern
            .as_ref()
            .is_none_or(|pattern| pattern.matches(&record.name.to_lowercase()))
    }

    /// Extension membership; the empty set means no constraint
    #[must_use]
    pub fn matches_extension(&self, record: &MftRecord) -> bool {
        self.extensions.is_empty() || self.extensions.contains(&record.extension)
    }

    /// Case-insensitive substring over the parent path only
    #[must_use]
    pub fn matches_path(&self, record: &MftRecord) -> bool {
        self.path_contains
            .as_ref()
            .is_none_or(|needle| record.parent_path.to_lowercase().contains(needle))
    }

    #[must_use]
    pub fn matches_size(&self, record: &MftRecord) -> bool {
        self.size.is_none_or(|range| range.contains(record.logical_size))
    }

    /// Every active date range must pass; null timestamps fail closed
    #[must_use]
    pub fn matches_dates(&self, record: &MftRecord) -> bool {
        self.dates
            .iter()
            .all(|date| date.contains(record.timestamp(date.source, date.kind)))
    }

    fn matches_flag_toggles(&self, record: &MftRecord) -> bool {
        (!self.toggles.directories_only || record.is_directory)
            && (!self.toggles.deleted_only || record.is_deleted)
            && (!self.toggles.ads_only || record.has_ads)
            && (!self.toggles.cooled_only || record.is_cooled)
    }

    fn matches_anomaly(&self, record: &MftRecord) -> bool {
        !self.toggles.anomaly_only || is_timeline_anomaly(record, self.anomaly_tolerance)
    }
}
