//! Dataset summary statistics
//!
//! Whole-store aggregates for the triage overview: attribute counts, the
//! extension distribution, size statistics, creation-timestamp spans per
//! attribute source, and the busiest directories. Everything here is a pure
//! read over an immutable store and serializes to JSON for the presentation
//! layer.

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::query::is_timeline_anomaly;
use crate::record::TimestampSource;
use crate::store::RecordStore;

/// How many entries the extension and directory rankings keep
const TOP_N: usize = 20;

/// One row of the extension distribution
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionStat {
    pub extension: String,
    pub count: usize,
    pub percent: f64,
}

/// Size statistics over non-directory records
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SizeStats {
    pub file_count: usize,
    pub total_bytes: u64,
    pub mean_bytes: u64,
    pub median_bytes: u64,
    pub largest_bytes: u64,
}

/// Creation-timestamp coverage for one attribute source
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TimestampSpan {
    pub source: TimestampSource,
    pub valid_count: usize,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

/// One row of the busiest-directory ranking
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryStat {
    pub path: String,
    pub count: usize,
}

/// Aggregate view of one loaded store
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub record_count: usize,
    pub directory_count: usize,
    pub deleted_count: usize,
    pub ads_count: usize,
    pub cooled_count: usize,
    /// Records flagged by the timeline-anomaly detector
    pub anomaly_count: usize,
    /// Extension distribution, most common first
    pub extensions: Vec<ExtensionStat>,
    pub sizes: SizeStats,
    /// One span per timestamp source ($SI, $FN)
    pub timestamp_spans: Vec<TimestampSpan>,
    /// Directories holding the most records, busiest first
    pub top_directories: Vec<DirectoryStat>,
}

impl DatasetSummary {
    /// Compute all aggregates for one store
    ///
    /// `anomaly_tolerance` is forwarded to the timeline-anomaly detector.
    #[must_use]
    pub fn compute(store: &RecordStore, anomaly_tolerance: Duration) -> Self {
        use crate::store::AttributeFlag;

        let record_count = store.len();

        let anomaly_count = store
            .records()
            .par_iter()
            .filter(|record| is_timeline_anomaly(record, anomaly_tolerance))
            .count();

        let mut extensions: Vec<ExtensionStat> = store
            .extension_counts()
            // Extensionless records are indexed under "" for querying but
            // carry no useful label in the ranking.
            .filter(|(extension, _)| !extension.is_empty())
            .map(|(extension, count)| ExtensionStat {
                extension: extension.to_string(),
                count,
                percent: if record_count == 0 {
                    0.0
                } else {
                    count as f64 / record_count as f64 * 100.0
                },
            })
            .collect();
        extensions.sort_by(|a, b| b.count.cmp(&a.count).then(a.extension.cmp(&b.extension)));
        extensions.truncate(TOP_N);

        let mut directory_counts: std::collections::HashMap<&str, usize> =
            std::collections::HashMap::new();
        for record in store {
            if !record.parent_path.is_empty() {
                *directory_counts.entry(record.parent_path.as_str()).or_default() += 1;
            }
        }
        let mut top_directories: Vec<DirectoryStat> = directory_counts
            .into_iter()
            .map(|(path, count)| DirectoryStat {
                path: path.to_string(),
                count,
            })
            .collect();
        top_directories.sort_by(|a, b| b.count.cmp(&a.count).then(a.path.cmp(&b.path)));
        top_directories.truncate(TOP_N);

        Self {
            record_count,
            directory_count: store.flag_positions(AttributeFlag::Directory).len(),
            deleted_count: store.flag_positions(AttributeFlag::Deleted).len(),
            ads_count: store.flag_positions(AttributeFlag::HasAds).len(),
            cooled_count: store.flag_positions(AttributeFlag::Cooled).len(),
            anomaly_count,
            extensions,
            sizes: size_stats(store),
            timestamp_spans: vec![
                created_span(store, TimestampSource::StandardInfo),
                created_span(store, TimestampSource::FileName),
            ],
            top_directories,
        }
    }
}

fn size_stats(store: &RecordStore) -> SizeStats {
    let mut sizes: Vec<u64> = store
        .iter()
        .filter(|record| !record.is_directory)
        .map(|record| record.logical_size)
        .collect();

    if sizes.is_empty() {
        return SizeStats::default();
    }
    sizes.sort_unstable();

    let total: u64 = sizes.iter().sum();
    SizeStats {
        file_count: sizes.len(),
        total_bytes: total,
        mean_bytes: total / sizes.len() as u64,
        median_bytes: sizes[sizes.len() / 2],
        largest_bytes: *sizes.last().unwrap_or(&0),
    }
}

fn created_span(store: &RecordStore, source: TimestampSource) -> TimestampSpan {
    let mut valid_count = 0usize;
    let mut earliest: Option<DateTime<Utc>> = None;
    let mut latest: Option<DateTime<Utc>> = None;

    for record in store {
        let created = match source {
            TimestampSource::StandardInfo => record.si_times.created,
            TimestampSource::FileName => record.fn_times.created,
        };
        if let Some(value) = created {
            valid_count += 1;
            earliest = Some(earliest.map_or(value, |e| e.min(value)));
            latest = Some(latest.map_or(value, |l| l.max(value)));
        }
    }

    TimestampSpan {
        source,
        valid_count,
        earliest,
        latest,
    }
}
