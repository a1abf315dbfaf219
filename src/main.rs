//! Mftsift CLI application entry point
//!
//! Loads an NTFS $MFT CSV export, runs one query against it, and prints the
//! matches (or dataset summary statistics) as text or JSON.
//!
//! # Usage
//!
//! ```bash
//! # Everything ending in .exe under \Windows\Temp
//! mftsift export.csv -e exe -p '\Windows\Temp'
//!
//! # Deleted files between 1KB and 10MB
//! mftsift export.csv --deleted-only --min-size 1KB --max-size 10MB
//!
//! # Timestomp candidates with a 10 second tolerance, as JSON
//! mftsift export.csv --anomaly --tolerance 10 --json
//!
//! # Dataset overview
//! mftsift export.csv --summary
//!
//! # Quiet mode (bare paths only, for piping)
//! mftsift -q export.csv -s invoice
//! ```

use std::sync::Arc;

use mftsift::{
    MftSiftError,
    analysis::DatasetSummary,
    cli::Cli,
    ingest::{LoadReport, Loader},
    output,
    query::execute,
    store::RecordStore,
};

type Result<T> = std::result::Result<T, MftSiftError>;

/// Load the CSV export, reporting progress and warnings to stderr
fn load_records(cli: &Cli) -> Result<LoadReport> {
    let loader = if cli.quiet {
        Loader::new()
    } else {
        Loader::new().with_progress(|progress| {
            eprintln!("  ... {} rows read", progress.rows_seen);
        })
    };

    let report = loader.load_path(&cli.csv)?;
    if !cli.quiet {
        output::print_load_diagnostics(&report, cli.max_warnings);
        eprintln!(
            "loaded {} record(s) from {}",
            report.records.len(),
            cli.csv.display()
        );
    }
    Ok(report)
}

/// Handle `--summary`: print dataset statistics instead of running a query
fn handle_summary(cli: &Cli, store: &RecordStore) -> Result<()> {
    let summary = DatasetSummary::compute(store, cli.anomaly_tolerance());
    if cli.json {
        output::print_summary_json(&summary)?;
    } else {
        output::print_summary(&summary);
    }
    Ok(())
}

/// Run the query described by the CLI arguments and print the matches
fn handle_query(cli: &Cli, store: &Arc<RecordStore>) -> Result<()> {
    let filters = cli.to_filter_set()?;
    let result = execute(store, &filters)?;

    if cli.json {
        output::print_result_json(&result, cli.limit)?;
    } else {
        output::print_result(&result, cli.limit, cli.quiet);
    }
    Ok(())
}

/// Main entry point for the mftsift application
///
/// Parses arguments, validates the filter set before touching the CSV, loads
/// the export into an indexed store, and dispatches to the summary or query
/// handler.
///
/// # Errors
///
/// Returns `MftSiftError` if argument conversion, loading, or querying fails.
fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Reject a bad filter set before spending time on the load.
    cli.to_filter_set()?;

    let report = load_records(&cli)?;
    let store = Arc::new(RecordStore::build(report.records));

    if cli.summary {
        handle_summary(&cli, &store)?;
    } else {
        handle_query(&cli, &store)?;
    }

    Ok(())
}
