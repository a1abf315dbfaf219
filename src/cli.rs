//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for mftsift using the `clap` crate,
//! plus the conversion from parsed arguments into a validated
//! [`FilterSet`](crate::query::FilterSet).
//!
//! # Design Features
//!
//! - One invocation, one query: the CSV path is positional, every filter
//!   category is a flag, and filters combine with AND
//! - Human-friendly sizes via `byte-unit` (`--min-size 10MB`)
//! - Dates accepted as `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` (UTC);
//!   a bare date means midnight
//! - `--quiet` flag for scripting-friendly output, `--json` for tooling
//!
//! # Examples
//!
//! ```
//! use mftsift::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["mftsift", "export.csv", "-e", "exe", "--deleted-only"]);
//! let filters = cli.to_filter_set().unwrap();
//! assert!(filters.toggles.deleted_only);
//! ```

use std::path::PathBuf;

use byte_unit::Byte;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, ValueEnum};

use crate::MftSiftError;
use crate::query::{DateFilter, FilterSet, SizeRange};
use crate::record::{TimestampKind, TimestampSource};

/// Which attribute's timestamps the date filters read
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSource {
    /// $STANDARD_INFORMATION timestamps (the ones Explorer shows)
    #[default]
    Si,
    /// $FILE_NAME timestamps (harder to forge)
    Fn,
}

impl From<DateSource> for TimestampSource {
    fn from(source: DateSource) -> Self {
        match source {
            DateSource::Si => Self::StandardInfo,
            DateSource::Fn => Self::FileName,
        }
    }
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mftsift")]
#[command(about = "Filter and triage NTFS $MFT CSV exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the MFT CSV export to load
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Case-insensitive substring match over the full path
    #[arg(short = 's', long = "search", value_name = "TEXT")]
    pub search: Option<String>,

    /// Wildcard pattern matched against the file name (* and ?)
    #[arg(short = 'n', long = "name", value_name = "PATTERN")]
    pub name: Option<String>,

    /// Extensions to match (can specify multiple: -e exe -e dll)
    #[arg(short = 'e', long = "ext", value_name = "EXT", num_args = 0..)]
    pub extensions: Vec<String>,

    /// Case-insensitive substring match over the parent path
    #[arg(short = 'p', long = "path", value_name = "TEXT")]
    pub path: Option<String>,

    /// Minimum logical size, inclusive (e.g. 500, 10KB, 2MiB)
    #[arg(long = "min-size", value_name = "SIZE")]
    pub min_size: Option<String>,

    /// Maximum logical size, inclusive
    #[arg(long = "max-size", value_name = "SIZE")]
    pub max_size: Option<String>,

    /// Creation time lower bound, inclusive
    #[arg(long = "created-from", value_name = "DATE")]
    pub created_from: Option<String>,

    /// Creation time upper bound, inclusive
    #[arg(long = "created-to", value_name = "DATE")]
    pub created_to: Option<String>,

    /// Modification time lower bound, inclusive
    #[arg(long = "modified-from", value_name = "DATE")]
    pub modified_from: Option<String>,

    /// Modification time upper bound, inclusive
    #[arg(long = "modified-to", value_name = "DATE")]
    pub modified_to: Option<String>,

    /// Record-change ($MFT entry) time lower bound, inclusive
    #[arg(long = "entry-modified-from", value_name = "DATE")]
    pub entry_modified_from: Option<String>,

    /// Record-change ($MFT entry) time upper bound, inclusive
    #[arg(long = "entry-modified-to", value_name = "DATE")]
    pub entry_modified_to: Option<String>,

    /// Access time lower bound, inclusive
    #[arg(long = "accessed-from", value_name = "DATE")]
    pub accessed_from: Option<String>,

    /// Access time upper bound, inclusive
    #[arg(long = "accessed-to", value_name = "DATE")]
    pub accessed_to: Option<String>,

    /// Which attribute's timestamps the date filters read
    #[arg(long = "date-source", value_enum, default_value_t = DateSource::Si)]
    pub date_source: DateSource,

    /// Only match directories
    #[arg(long = "dirs-only")]
    pub dirs_only: bool,

    /// Only match deleted records
    #[arg(long = "deleted-only")]
    pub deleted_only: bool,

    /// Only match records with alternate data streams
    #[arg(long = "ads")]
    pub ads: bool,

    /// Only match cooled records
    #[arg(long = "cooled")]
    pub cooled: bool,

    /// Only match records flagged by the timeline-anomaly detector
    #[arg(long = "anomaly")]
    pub anomaly: bool,

    /// Anomaly detector tolerance in seconds
    #[arg(long = "tolerance", value_name = "SECONDS", default_value_t = 0)]
    pub tolerance: u32,

    /// Print dataset summary statistics instead of matches
    #[arg(long = "summary")]
    pub summary: bool,

    /// Emit JSON instead of text
    #[arg(long = "json")]
    pub json: bool,

    /// Show at most this many matches
    #[arg(short = 'l', long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// How many load warnings to print before suppressing the rest
    #[arg(long = "max-warnings", value_name = "N", default_value_t = 10)]
    pub max_warnings: usize,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Anomaly detector tolerance as a duration
    #[must_use]
    pub fn anomaly_tolerance(&self) -> Duration {
        Duration::seconds(i64::from(self.tolerance))
    }

    /// Build the filter set described by the parsed arguments
    ///
    /// # Errors
    /// Returns `MftSiftError::InvalidInput` when a size or date argument does
    /// not parse, and `MftSiftError::FilterError` when the resulting set is
    /// internally inconsistent (validation runs again at execution time, but
    /// failing here gives the error before the CSV is loaded).
    pub fn to_filter_set(&self) -> Result<FilterSet, MftSiftError> {
        let mut filters = FilterSet {
            quick_search: self.search.clone(),
            name_pattern: self.name.clone(),
            extensions: self.extensions.iter().cloned().collect(),
            path_contains: self.path.clone(),
            anomaly_tolerance: self.anomaly_tolerance(),
            ..FilterSet::default()
        };

        if self.min_size.is_some() || self.max_size.is_some() {
            filters.size = Some(SizeRange {
                min: self.min_size.as_deref().map(parse_size).transpose()?,
                max: self.max_size.as_deref().map(parse_size).transpose()?,
            });
        }

        let source = TimestampSource::from(self.date_source);
        for (kind, from, to) in [
            (TimestampKind::Created, &self.created_from, &self.created_to),
            (
                TimestampKind::Modified,
                &self.modified_from,
                &self.modified_to,
            ),
            (
                TimestampKind::EntryModified,
                &self.entry_modified_from,
                &self.entry_modified_to,
            ),
            (
                TimestampKind::Accessed,
                &self.accessed_from,
                &self.accessed_to,
            ),
        ] {
            if from.is_some() || to.is_some() {
                filters.dates.push(DateFilter {
                    kind,
                    source,
                    from: from.as_deref().map(parse_date).transpose()?,
                    to: to.as_deref().map(parse_date).transpose()?,
                });
            }
        }

        filters.toggles.directories_only = self.dirs_only;
        filters.toggles.deleted_only = self.deleted_only;
        filters.toggles.ads_only = self.ads;
        filters.toggles.cooled_only = self.cooled;
        filters.toggles.anomaly_only = self.anomaly;

        filters.validate()?;
        Ok(filters)
    }
}

/// Parse a human-friendly size argument into bytes
///
/// # Errors
/// Returns `MftSiftError::InvalidInput` when the value is not a size.
pub fn parse_size(value: &str) -> Result<u64, MftSiftError> {
    Byte::parse_str(value, true)
        .map(|byte| byte.as_u64())
        .map_err(|e| MftSiftError::InvalidInput(format!("Invalid size '{value}': {e}")))
}

/// Parse a date argument as UTC
///
/// Accepts `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD`, which is read as
/// midnight.
///
/// # Errors
/// Returns `MftSiftError::InvalidInput` when neither form parses.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, MftSiftError> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(datetime.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
        .map_err(|_| {
            MftSiftError::InvalidInput(format!(
                "Invalid date '{value}': expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_invocation() {
        let cli = Cli::parse_from(["mftsift", "export.csv"]);
        assert_eq!(cli.csv, PathBuf::from("export.csv"));
        let filters = cli.to_filter_set().unwrap();
        assert!(filters.is_unconstrained());
    }

    #[test]
    fn test_parse_multiple_extensions() {
        let cli = Cli::parse_from(["mftsift", "export.csv", "-e", "exe", "-e", "dll"]);
        let filters = cli.to_filter_set().unwrap();
        assert_eq!(filters.extensions.len(), 2);
        assert!(filters.extensions.contains("exe"));
        assert!(filters.extensions.contains("dll"));
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("500").unwrap(), 500);
        assert_eq!(parse_size("10KB").unwrap(), 10_000);
        assert_eq!(parse_size("2MiB").unwrap(), 2 * 1024 * 1024);
        assert!(parse_size("plenty").is_err());
    }

    #[test]
    fn test_parse_date_forms() {
        let midnight = parse_date("2024-03-01").unwrap();
        let explicit = parse_date("2024-03-01 00:00:00").unwrap();
        assert_eq!(midnight, explicit);
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_size_range_from_flags() {
        let cli = Cli::parse_from([
            "mftsift",
            "export.csv",
            "--min-size",
            "1KB",
            "--max-size",
            "1MB",
        ]);
        let filters = cli.to_filter_set().unwrap();
        let size = filters.size.unwrap();
        assert_eq!(size.min, Some(1000));
        assert_eq!(size.max, Some(1_000_000));
    }

    #[test]
    fn test_inverted_size_range_rejected_at_parse() {
        let cli = Cli::parse_from([
            "mftsift",
            "export.csv",
            "--min-size",
            "1MB",
            "--max-size",
            "1KB",
        ]);
        assert!(cli.to_filter_set().is_err());
    }

    #[test]
    fn test_date_filter_uses_selected_source() {
        let cli = Cli::parse_from([
            "mftsift",
            "export.csv",
            "--created-from",
            "2024-01-01",
            "--date-source",
            "fn",
        ]);
        let filters = cli.to_filter_set().unwrap();
        assert_eq!(filters.dates.len(), 1);
        assert_eq!(filters.dates[0].kind, TimestampKind::Created);
        assert_eq!(filters.dates[0].source, TimestampSource::FileName);
    }

    #[test]
    fn test_toggles_and_tolerance() {
        let cli = Cli::parse_from([
            "mftsift",
            "export.csv",
            "--deleted-only",
            "--anomaly",
            "--tolerance",
            "30",
        ]);
        let filters = cli.to_filter_set().unwrap();
        assert!(filters.toggles.deleted_only);
        assert!(filters.toggles.anomaly_only);
        assert_eq!(filters.anomaly_tolerance, Duration::seconds(30));
    }
}
