//! Output formatting for CLI display
//!
//! Renders query results, load diagnostics, and dataset summaries as plain
//! text (with a little color for triage-relevant flags) or as JSON for
//! downstream tooling.

use colored::Colorize;
use serde::Serialize;

use crate::analysis::DatasetSummary;
use crate::ingest::{LoadReport, RowWarning};
use crate::query::QueryResult;
use crate::record::MftRecord;

/// Serializable view of one matched record, for `--json` output
#[derive(Debug, Serialize)]
pub struct MatchView<'a> {
    pub entry_id: u64,
    pub path: String,
    pub extension: &'a str,
    pub logical_size: u64,
    pub is_directory: bool,
    pub is_deleted: bool,
    pub has_ads: bool,
    pub is_cooled: bool,
}

impl<'a> From<&'a MftRecord> for MatchView<'a> {
    fn from(record: &'a MftRecord) -> Self {
        Self {
            entry_id: record.entry_id,
            path: record.full_path(),
            extension: &record.extension,
            logical_size: record.logical_size,
            is_directory: record.is_directory,
            is_deleted: record.is_deleted,
            has_ads: record.has_ads,
            is_cooled: record.is_cooled,
        }
    }
}

/// Serializable envelope for `--json` output
#[derive(Debug, Serialize)]
pub struct ResultView<'a> {
    pub total: usize,
    pub matched: usize,
    pub records: Vec<MatchView<'a>>,
}

/// Format one matched record as a display line
#[must_use]
pub fn format_match(record: &MftRecord, quiet: bool) -> String {
    let path = record.full_path();
    if quiet {
        return path;
    }

    let mut flags: Vec<&str> = Vec::new();
    if record.is_directory {
        flags.push("dir");
    }
    if record.is_deleted {
        flags.push("deleted");
    }
    if record.has_ads {
        flags.push("ads");
    }
    if record.is_cooled {
        flags.push("cooled");
    }

    let shown_path = if record.is_deleted {
        path.red().to_string()
    } else {
        path
    };

    if flags.is_empty() {
        format!(
            "  #{:<8} {:>12}  {}",
            record.entry_id, record.logical_size, shown_path
        )
    } else {
        format!(
            "  #{:<8} {:>12}  {} [{}]",
            record.entry_id,
            record.logical_size,
            shown_path,
            flags.join(", ")
        )
    }
}

/// Print matched records followed by the match counts
pub fn print_result(result: &QueryResult, limit: Option<usize>, quiet: bool) {
    let shown = limit.unwrap_or(usize::MAX);
    for record in result.iter().take(shown) {
        println!("{}", format_match(record, quiet));
    }
    if !quiet {
        if result.matched() > shown {
            println!("  ... {} more not shown", result.matched() - shown);
        }
        println!(
            "{}",
            format!("matched {} of {} records", result.matched(), result.total()).bold()
        );
    }
}

/// Print matched records as a JSON envelope
///
/// # Errors
/// Returns `serde_json::Error` if serialization fails.
pub fn print_result_json(
    result: &QueryResult,
    limit: Option<usize>,
) -> Result<(), serde_json::Error> {
    let records: Vec<MatchView<'_>> = result
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(MatchView::from)
        .collect();
    let view = ResultView {
        total: result.total(),
        matched: result.matched(),
        records,
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

/// Print ingestion diagnostics to stderr
pub fn print_load_diagnostics(report: &LoadReport, max_warnings: usize) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!(
        "{}",
        format!(
            "{} warning(s), {} row(s) rejected",
            report.warnings.len(),
            report.rejected_rows
        )
        .yellow()
    );
    for warning in report.warnings.iter().take(max_warnings) {
        match warning {
            RowWarning::MalformedRow { .. } => eprintln!("  {}", warning.to_string().red()),
            _ => eprintln!("  {}", warning.to_string().yellow()),
        }
    }
    if report.warnings.len() > max_warnings {
        eprintln!("  ... {} more suppressed", report.warnings.len() - max_warnings);
    }
}

/// Print a dataset summary as text
pub fn print_summary(summary: &DatasetSummary) {
    println!("{}", "Dataset summary".bold());
    println!("  records:     {}", summary.record_count);
    println!("  directories: {}", summary.directory_count);
    println!("  deleted:     {}", summary.deleted_count);
    println!("  with ADS:    {}", summary.ads_count);
    println!("  cooled:      {}", summary.cooled_count);
    println!("  anomalies:   {}", summary.anomaly_count);

    println!(
        "  files: {} ({} bytes total, mean {}, median {}, largest {})",
        summary.sizes.file_count,
        summary.sizes.total_bytes,
        summary.sizes.mean_bytes,
        summary.sizes.median_bytes,
        summary.sizes.largest_bytes
    );

    for span in &summary.timestamp_spans {
        match (span.earliest, span.latest) {
            (Some(earliest), Some(latest)) => println!(
                "  {} created: {} to {} ({} valid)",
                span.source, earliest, latest, span.valid_count
            ),
            _ => println!("  {} created: no valid timestamps", span.source),
        }
    }

    if !summary.extensions.is_empty() {
        println!("{}", "Top extensions".bold());
        for stat in &summary.extensions {
            println!(
                "  .{:<12} {:>8} ({:.2}%)",
                stat.extension, stat.count, stat.percent
            );
        }
    }

    if !summary.top_directories.is_empty() {
        println!("{}", "Busiest directories".bold());
        for stat in &summary.top_directories {
            println!("  {:>8}  {}", stat.count, stat.path);
        }
    }
}

/// Print a dataset summary as JSON
///
/// # Errors
/// Returns `serde_json::Error` if serialization fails.
pub fn print_summary_json(summary: &DatasetSummary) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
