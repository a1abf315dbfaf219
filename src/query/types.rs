//! Filter criteria types
//!
//! A [`FilterSet`] maps each filter category to the caller's criterion for
//! it; absent categories impose no constraint, so the default value matches
//! every record. Criteria are plain data; compilation into match-ready form
//! happens once per query in [`super::predicates::CompiledFilter`].

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use glob::Pattern;

use super::error::FilterError;
use crate::record::{TimestampKind, TimestampSource};

/// Inclusive size bounds on `logical_size`, in bytes
///
/// An absent bound is unconstrained on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl SizeRange {
    /// Whether `size` falls within the bounds (inclusive)
    #[must_use]
    pub fn contains(&self, size: u64) -> bool {
        self.min.is_none_or(|min| size >= min) && self.max.is_none_or(|max| size <= max)
    }
}

/// Inclusive date bounds on one timestamp kind from one source
///
/// A record whose selected timestamp is null never matches a bounded range
/// (fails closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub kind: TimestampKind,
    pub source: TimestampSource,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateFilter {
    /// Whether `value` falls within the bounds (inclusive); `None` never matches
    #[must_use]
    pub fn contains(&self, value: Option<DateTime<Utc>>) -> bool {
        let Some(value) = value else {
            return false;
        };
        self.from.is_none_or(|from| value >= from) && self.to.is_none_or(|to| value <= to)
    }
}

/// Boolean attribute toggles; each enabled toggle requires its flag, and
/// multiple enabled toggles combine with AND
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeToggles {
    pub directories_only: bool,
    pub deleted_only: bool,
    pub ads_only: bool,
    pub cooled_only: bool,
    /// Timeline-anomaly detector (see [`crate::query::is_timeline_anomaly`]);
    /// composes like any other toggle
    pub anomaly_only: bool,
}

impl AttributeToggles {
    #[must_use]
    pub const fn any_enabled(&self) -> bool {
        self.directories_only
            || self.deleted_only
            || self.ads_only
            || self.cooled_only
            || self.anomaly_only
    }
}

/// The active criteria for one query
///
/// The effective predicate is the AND of every non-empty category; within the
/// extension set, membership is OR. All text matching is case-insensitive.
///
/// # Examples
/// ```
/// use mftsift::query::{FilterSet, SizeRange};
///
/// let mut filters = FilterSet::default();
/// filters.extensions = ["exe".to_string(), "dll".to_string()].into();
/// filters.size = Some(SizeRange { min: Some(1024), max: None });
/// filters.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    /// Substring match over name + parent path
    pub quick_search: Option<String>,
    /// `*`/`?` wildcard match, anchored to the whole name
    pub name_pattern: Option<String>,
    /// Extension membership; empty means no constraint, not "match nothing"
    pub extensions: HashSet<String>,
    /// Substring match over the parent path only
    pub path_contains: Option<String>,
    pub size: Option<SizeRange>,
    /// Up to four date ranges, one per timestamp kind
    pub dates: Vec<DateFilter>,
    pub toggles: AttributeToggles,
    /// Slack subtracted from the $SI creation time before the anomaly
    /// comparison; zero flags any strictly earlier $FN creation time
    pub anomaly_tolerance: Duration,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            quick_search: None,
            name_pattern: None,
            extensions: HashSet::new(),
            path_contains: None,
            size: None,
            dates: Vec::new(),
            toggles: AttributeToggles::default(),
            anomaly_tolerance: Duration::zero(),
        }
    }
}

impl FilterSet {
    /// True when no category constrains anything; such a set matches the
    /// whole store
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.quick_search.is_none()
            && self.name_pattern.is_none()
            && self.extensions.is_empty()
            && self.path_contains.is_none()
            && self.size.is_none()
            && self.dates.is_empty()
            && !self.toggles.any_enabled()
    }

    /// Check the criteria for internal consistency
    ///
    /// Run before every query; an inconsistent set never executes.
    ///
    /// # Errors
    /// Returns `FilterError` if a size or date range is inverted, a timestamp
    /// kind has more than one date filter, or the name pattern fails to
    /// compile as a wildcard expression.
    pub fn validate(&self) -> Result<(), FilterError> {
        if let Some(size) = &self.size {
            if let (Some(min), Some(max)) = (size.min, size.max) {
                if min > max {
                    return Err(FilterError::InvalidSizeRange { min, max });
                }
            }
        }

        let mut seen_kinds: Vec<TimestampKind> = Vec::new();
        for date in &self.dates {
            if seen_kinds.contains(&date.kind) {
                return Err(FilterError::DuplicateDateFilter(date.kind));
            }
            seen_kinds.push(date.kind);

            if let (Some(from), Some(to)) = (date.from, date.to) {
                if from > to {
                    return Err(FilterError::InvalidDateRange {
                        kind: date.kind,
                        from,
                        to,
                    });
                }
            }
        }

        if let Some(pattern) = &self.name_pattern {
            Pattern::new(&pattern.to_lowercase()).map_err(|source| {
                FilterError::InvalidNamePattern {
                    pattern: pattern.clone(),
                    source,
                }
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_is_unconstrained() {
        assert!(FilterSet::default().is_unconstrained());
        assert!(FilterSet::default().validate().is_ok());
    }

    #[test]
    fn test_size_range_inclusive_bounds() {
        let range = SizeRange {
            min: Some(10),
            max: Some(20),
        };
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.contains(21));
    }

    #[test]
    fn test_size_range_open_sides() {
        assert!(SizeRange { min: None, max: Some(5) }.contains(0));
        assert!(SizeRange { min: Some(5), max: None }.contains(u64::MAX));
    }

    #[test]
    fn test_inverted_size_range_rejected() {
        let mut filters = FilterSet::default();
        filters.size = Some(SizeRange {
            min: Some(100),
            max: Some(10),
        });
        assert!(matches!(
            filters.validate(),
            Err(FilterError::InvalidSizeRange { min: 100, max: 10 })
        ));
    }

    #[test]
    fn test_null_timestamp_fails_closed() {
        let filter = DateFilter {
            kind: TimestampKind::Created,
            source: TimestampSource::StandardInfo,
            from: None,
            to: Some(Utc.timestamp_opt(1_000_000, 0).unwrap()),
        };
        assert!(!filter.contains(None));
    }

    #[test]
    fn test_inverted_date_range_rejected() {
        let mut filters = FilterSet::default();
        filters.dates.push(DateFilter {
            kind: TimestampKind::Modified,
            source: TimestampSource::FileName,
            from: Some(Utc.timestamp_opt(200, 0).unwrap()),
            to: Some(Utc.timestamp_opt(100, 0).unwrap()),
        });
        assert!(matches!(
            filters.validate(),
            Err(FilterError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_duplicate_date_kind_rejected() {
        let mut filters = FilterSet::default();
        for source in [TimestampSource::StandardInfo, TimestampSource::FileName] {
            filters.dates.push(DateFilter {
                kind: TimestampKind::Created,
                source,
                from: None,
                to: None,
            });
        }
        assert!(matches!(
            filters.validate(),
            Err(FilterError::DuplicateDateFilter(TimestampKind::Created))
        ));
    }

    #[test]
    fn test_invalid_name_pattern_rejected() {
        let mut filters = FilterSet::default();
        filters.name_pattern = Some("[".to_string());
        assert!(matches!(
            filters.validate(),
            Err(FilterError::InvalidNamePattern { .. })
        ));
    }
}
