//! Streaming CSV loader for MFT table exports
//!
//! Consumes the row/column text produced by the upstream converter and turns
//! it into [`MftRecord`] values in a single pass. Columns are resolved by
//! header name, not position, so the loader tolerates column reordering
//! between converter versions. Only the parsed records are kept resident;
//! memory scales with record count, not raw text size.
//!
//! Recovery policy: a row that does not fit the expected shape is rejected
//! and reported, a field that fails coercion gets its documented default and
//! a warning. Neither aborts the load. Only an unreadable source, a missing
//! header column, or an explicit cancellation does.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};

use super::error::IngestError;
use crate::record::{MftRecord, Timestamps};

/// The one timestamp format the upstream converter emits (UTC)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// How often the progress callback fires, in rows
const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

/// Required columns, by header name. `0x10` columns come from
/// $STANDARD_INFORMATION, `0x30` columns from $FILE_NAME.
const COL_ENTRY: &str = "EntryNumber";
const COL_SEQUENCE: &str = "SequenceNumber";
const COL_PARENT_ENTRY: &str = "ParentEntryNumber";
const COL_IN_USE: &str = "InUse";
const COL_PARENT_PATH: &str = "ParentPath";
const COL_FILE_NAME: &str = "FileName";
const COL_EXTENSION: &str = "Extension";
const COL_IS_DIRECTORY: &str = "IsDirectory";
const COL_HAS_ADS: &str = "HasAds";
const COL_IS_COOLED: &str = "IsCooled";
const COL_LOGICAL_SIZE: &str = "LogicalSize";
const COL_PHYSICAL_SIZE: &str = "PhysicalSize";
const COLS_SI: [&str; 4] = [
    "Created0x10",
    "LastModified0x10",
    "LastRecordChange0x10",
    "LastAccess0x10",
];
const COLS_FN: [&str; 4] = [
    "Created0x30",
    "LastModified0x30",
    "LastRecordChange0x30",
    "LastAccess0x30",
];

/// Non-fatal problem encountered while ingesting one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowWarning {
    /// The row did not fit the expected shape and was skipped entirely
    MalformedRow { line: u64, detail: String },
    /// A timestamp cell failed strict parsing; the field was set to null
    TimestampParse {
        line: u64,
        column: String,
        value: String,
    },
    /// A size cell was unparsable or negative; the field was set to zero
    SizeParse {
        line: u64,
        column: String,
        value: String,
    },
    /// A boolean cell held an unrecognized token; the field was set to false
    FlagParse {
        line: u64,
        column: String,
        value: String,
    },
}

impl std::fmt::Display for RowWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRow { line, detail } => {
                write!(f, "line {line}: row rejected: {detail}")
            }
            Self::TimestampParse {
                line,
                column,
                value,
            } => write!(
                f,
                "line {line}: unparsable timestamp in {column}: '{value}' (set to null)"
            ),
            Self::SizeParse {
                line,
                column,
                value,
            } => write!(
                f,
                "line {line}: unparsable size in {column}: '{value}' (set to 0)"
            ),
            Self::FlagParse {
                line,
                column,
                value,
            } => write!(
                f,
                "line {line}: unrecognized flag token in {column}: '{value}' (set to false)"
            ),
        }
    }
}

/// Snapshot passed to the progress callback during a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub rows_seen: u64,
    pub rows_rejected: u64,
}

/// Outcome of one complete load pass
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Parsed records, in input order
    pub records: Vec<MftRecord>,
    /// Every row- and field-level problem encountered, in input order
    pub warnings: Vec<RowWarning>,
    /// Count of rows rejected outright (subset of `warnings`)
    pub rejected_rows: usize,
}

type ProgressFn = Box<dyn Fn(LoadProgress) + Send + Sync>;

/// Configurable one-shot CSV loader
///
/// # Examples
/// ```no_run
/// use mftsift::ingest::Loader;
/// use std::path::Path;
///
/// let report = Loader::new().load_path(Path::new("mft.csv")).unwrap();
/// println!("{} records, {} warnings", report.records.len(), report.warnings.len());
/// ```
#[derive(Default)]
pub struct Loader {
    progress: Option<ProgressFn>,
    progress_interval: Option<u64>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Loader {
    /// Create a loader with no progress reporting and no cancel flag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report incremental progress through `callback` while loading
    #[must_use]
    pub fn with_progress(mut self, callback: impl Fn(LoadProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Fire the progress callback every `rows` rows instead of the default
    #[must_use]
    pub const fn progress_interval(mut self, rows: u64) -> Self {
        self.progress_interval = Some(rows);
        self
    }

    /// Abort the load (discarding all partial data) once `flag` becomes true
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Load records from a CSV file on disk
    ///
    /// # Errors
    /// Returns `IngestError` if the file cannot be opened, the header lacks a
    /// required column, the stream breaks mid-read, or the load is cancelled.
    pub fn load_path(&self, path: &Path) -> Result<LoadReport, IngestError> {
        let file = std::fs::File::open(path)?;
        self.load_reader(file)
    }

    /// Load records from any CSV byte stream
    ///
    /// # Errors
    /// Returns `IngestError` if the header lacks a required column, the
    /// stream breaks mid-read, or the load is cancelled.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadReport, IngestError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns = ColumnMap::resolve(csv_reader.headers()?)?;
        let expected_fields = csv_reader.headers()?.len();
        let interval = self.progress_interval.unwrap_or(DEFAULT_PROGRESS_INTERVAL);

        let mut report = LoadReport::default();
        let mut rows_seen: u64 = 0;

        // Rows are read as raw bytes so that a single undecodable row (real
        // exports of damaged volumes contain them) is rejected locally
        // instead of failing the whole load; only genuine stream errors
        // reach the `?` below.
        for row in csv_reader.byte_records() {
            if let Some(flag) = &self.cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(IngestError::Aborted);
                }
            }

            let row = row?;
            rows_seen += 1;
            let line = row.position().map_or(0, csv::Position::line);

            if row.len() != expected_fields {
                report.warnings.push(RowWarning::MalformedRow {
                    line,
                    detail: format!("expected {expected_fields} fields, found {}", row.len()),
                });
                report.rejected_rows += 1;
            } else {
                match StringRecord::from_byte_record(row) {
                    Ok(row) => match parse_row(&row, &columns, line, &mut report.warnings) {
                        Some(record) => report.records.push(record),
                        None => report.rejected_rows += 1,
                    },
                    Err(_) => {
                        report.warnings.push(RowWarning::MalformedRow {
                            line,
                            detail: "invalid UTF-8 in row".to_string(),
                        });
                        report.rejected_rows += 1;
                    }
                }
            }

            if rows_seen % interval == 0 {
                if let Some(callback) = &self.progress {
                    callback(LoadProgress {
                        rows_seen,
                        rows_rejected: report.rejected_rows as u64,
                    });
                }
            }
        }

        if let Some(callback) = &self.progress {
            callback(LoadProgress {
                rows_seen,
                rows_rejected: report.rejected_rows as u64,
            });
        }

        Ok(report)
    }
}

/// Header-name → field-index mapping for one input file
#[derive(Debug, Clone)]
struct ColumnMap {
    entry: usize,
    sequence: usize,
    parent_entry: usize,
    in_use: usize,
    parent_path: usize,
    file_name: usize,
    extension: usize,
    is_directory: usize,
    has_ads: usize,
    is_cooled: usize,
    logical_size: usize,
    physical_size: usize,
    si: [usize; 4],
    fn_: [usize; 4],
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self, IngestError> {
        let find = |name: &'static str| -> Result<usize, IngestError> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(IngestError::MissingColumn(name))
        };

        let mut si = [0usize; 4];
        for (slot, name) in si.iter_mut().zip(COLS_SI) {
            *slot = find(name)?;
        }
        let mut fn_ = [0usize; 4];
        for (slot, name) in fn_.iter_mut().zip(COLS_FN) {
            *slot = find(name)?;
        }

        Ok(Self {
            entry: find(COL_ENTRY)?,
            sequence: find(COL_SEQUENCE)?,
            parent_entry: find(COL_PARENT_ENTRY)?,
            in_use: find(COL_IN_USE)?,
            parent_path: find(COL_PARENT_PATH)?,
            file_name: find(COL_FILE_NAME)?,
            extension: find(COL_EXTENSION)?,
            is_directory: find(COL_IS_DIRECTORY)?,
            has_ads: find(COL_HAS_ADS)?,
            is_cooled: find(COL_IS_COOLED)?,
            logical_size: find(COL_LOGICAL_SIZE)?,
            physical_size: find(COL_PHYSICAL_SIZE)?,
            si,
            fn_,
        })
    }
}

/// Parse one shape-valid row, or reject it when its identity fields are unusable
fn parse_row(
    row: &StringRecord,
    columns: &ColumnMap,
    line: u64,
    warnings: &mut Vec<RowWarning>,
) -> Option<MftRecord> {
    let field = |idx: usize| row.get(idx).unwrap_or("").trim();

    // Identity columns have no sensible default; a row without them is malformed.
    let entry_id = match field(columns.entry).parse::<u64>() {
        Ok(id) => id,
        Err(_) => {
            warnings.push(RowWarning::MalformedRow {
                line,
                detail: format!("unparsable {COL_ENTRY} '{}'", field(columns.entry)),
            });
            return None;
        }
    };
    let sequence_number = match field(columns.sequence).parse::<u16>() {
        Ok(seq) => seq,
        Err(_) => {
            warnings.push(RowWarning::MalformedRow {
                line,
                detail: format!("unparsable {COL_SEQUENCE} '{}'", field(columns.sequence)),
            });
            return None;
        }
    };

    let parent_entry_id = field(columns.parent_entry).parse::<u64>().ok();

    let mut parse_flag = |idx: usize, column: &str| -> bool {
        let value = field(idx);
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => true,
            "" | "false" | "no" | "n" | "0" => false,
            _ => {
                warnings.push(RowWarning::FlagParse {
                    line,
                    column: column.to_string(),
                    value: value.to_string(),
                });
                false
            }
        }
    };

    let in_use = parse_flag(columns.in_use, COL_IN_USE);
    let is_directory = parse_flag(columns.is_directory, COL_IS_DIRECTORY);
    let has_ads = parse_flag(columns.has_ads, COL_HAS_ADS);
    let is_cooled = parse_flag(columns.is_cooled, COL_IS_COOLED);

    let mut parse_size = |idx: usize, column: &str| -> u64 {
        let value = field(idx);
        match value.parse::<u64>() {
            Ok(size) => size,
            Err(_) => {
                warnings.push(RowWarning::SizeParse {
                    line,
                    column: column.to_string(),
                    value: value.to_string(),
                });
                0
            }
        }
    };

    let logical_size = parse_size(columns.logical_size, COL_LOGICAL_SIZE);
    let physical_size = parse_size(columns.physical_size, COL_PHYSICAL_SIZE);

    let mut parse_timestamp = |idx: usize, column: &str| -> Option<DateTime<Utc>> {
        let value = field(idx);
        if value.is_empty() {
            // Absent data, not a coercion failure. Deleted entries routinely
            // lack whole timestamp groups.
            return None;
        }
        match NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
            Ok(naive) => Some(naive.and_utc()),
            Err(_) => {
                warnings.push(RowWarning::TimestampParse {
                    line,
                    column: column.to_string(),
                    value: value.to_string(),
                });
                None
            }
        }
    };

    let mut timestamp_group = |indices: [usize; 4], names: [&str; 4]| -> Timestamps {
        Timestamps {
            created: parse_timestamp(indices[0], names[0]),
            modified: parse_timestamp(indices[1], names[1]),
            entry_modified: parse_timestamp(indices[2], names[2]),
            accessed: parse_timestamp(indices[3], names[3]),
        }
    };

    let si_times = timestamp_group(columns.si, COLS_SI);
    let fn_times = timestamp_group(columns.fn_, COLS_FN);

    let name = field(columns.file_name).to_string();
    let extension = normalize_extension(field(columns.extension), &name);

    Some(MftRecord {
        entry_id,
        sequence_number,
        parent_entry_id,
        name,
        parent_path: field(columns.parent_path).to_string(),
        extension,
        logical_size,
        physical_size,
        si_times,
        fn_times,
        is_directory,
        is_deleted: !in_use,
        has_ads,
        is_cooled,
    })
}

/// Lower-case the extension column, stripping any leading dot; fall back to
/// deriving it from the file name when the column is empty
fn normalize_extension(raw: &str, name: &str) -> String {
    let trimmed = raw.trim_start_matches('.');
    if !trimmed.is_empty() {
        return trimmed.to_lowercase();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CSV_HEADER, csv_row};

    fn load(input: &str) -> LoadReport {
        Loader::new().load_reader(input.as_bytes()).unwrap()
    }

    #[test]
    fn test_load_single_row() {
        let input = format!(
            "{CSV_HEADER}\n{}",
            csv_row(5, "notes.txt", r"C:\Users\kim", 1024)
        );
        let report = load(&input);

        assert_eq!(report.records.len(), 1);
        assert!(report.warnings.is_empty());
        let record = &report.records[0];
        assert_eq!(record.entry_id, 5);
        assert_eq!(record.name, "notes.txt");
        assert_eq!(record.extension, "txt");
        assert_eq!(record.logical_size, 1024);
        assert!(!record.is_deleted);
    }

    #[test]
    fn test_malformed_row_skipped_not_fatal() {
        let input = format!(
            "{CSV_HEADER}\n{}\nonly,three,fields\n{}",
            csv_row(1, "a.txt", r"C:\x", 10),
            csv_row(2, "b.txt", r"C:\x", 20)
        );
        let report = load(&input);

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.rejected_rows, 1);
        assert!(matches!(
            report.warnings[0],
            RowWarning::MalformedRow { .. }
        ));
        // Rejection does not disturb neighboring entry ids.
        assert_eq!(report.records[0].entry_id, 1);
        assert_eq!(report.records[1].entry_id, 2);
    }

    #[test]
    fn test_undecodable_row_rejected_not_fatal() {
        // Middle row carries a raw 0xFF byte in the filename.
        let mut input = format!("{CSV_HEADER}\n{}\n", csv_row(1, "a.txt", r"C:\x", 10)).into_bytes();
        let mut bad = csv_row(2, "b_d.txt", r"C:\x", 20).into_bytes();
        if let Some(byte) = bad.iter_mut().find(|b| **b == b'_') {
            *byte = 0xFF;
        }
        input.extend_from_slice(&bad);
        input.push(b'\n');
        input.extend_from_slice(csv_row(3, "c.txt", r"C:\x", 30).as_bytes());

        let report = Loader::new().load_reader(input.as_slice()).unwrap();

        assert_eq!(report.rejected_rows, 1);
        assert!(matches!(
            report.warnings[0],
            RowWarning::MalformedRow { .. }
        ));
        let ids: Vec<u64> = report.records.iter().map(|r| r.entry_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_bad_timestamp_yields_null_and_warning() {
        let row = csv_row(7, "x.dll", r"C:\Windows", 99).replace(
            "2023-06-01 10:00:00.0000000",
            "2023-13-99 not-a-date",
        );
        let report = load(&format!("{CSV_HEADER}\n{row}"));

        assert_eq!(report.records.len(), 1);
        assert!(report.records[0].si_times.created.is_none());
        assert!(
            report
                .warnings
                .iter()
                .any(|w| matches!(w, RowWarning::TimestampParse { .. }))
        );
    }

    #[test]
    fn test_empty_timestamp_is_silent_null() {
        let row = csv_row(7, "x.dll", r"C:\Windows", 99)
            .replace("2023-06-01 10:00:00.0000000", "");
        let report = load(&format!("{CSV_HEADER}\n{row}"));

        assert!(report.records[0].si_times.created.is_none());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_strict_calendar_validation() {
        // Feb 30 is shape-valid but not a real date.
        let row = csv_row(8, "y.sys", r"C:\Windows", 0).replace(
            "2023-06-01 10:00:00.0000000",
            "2023-02-30 10:00:00.0000000",
        );
        let report = load(&format!("{CSV_HEADER}\n{row}"));

        assert!(report.records[0].si_times.created.is_none());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_negative_size_defaults_to_zero() {
        let row = csv_row(9, "z.bin", r"C:\tmp", 0).replace(",0,4096,", ",-5,4096,");
        let report = load(&format!("{CSV_HEADER}\n{row}"));

        assert_eq!(report.records[0].logical_size, 0);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| matches!(w, RowWarning::SizeParse { .. }))
        );
    }

    #[test]
    fn test_unrecognized_flag_defaults_to_false() {
        let row = csv_row(10, "w.txt", r"C:\tmp", 1).replace(",False,False,", ",maybe,False,");
        let report = load(&format!("{CSV_HEADER}\n{row}"));

        assert_eq!(report.records.len(), 1);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| matches!(w, RowWarning::FlagParse { .. }))
        );
    }

    #[test]
    fn test_flag_vocabulary_case_insensitive() {
        let row = csv_row(11, "v.txt", r"C:\tmp", 1).replace(",True,", ",YES,");
        let report = load(&format!("{CSV_HEADER}\n{row}"));

        assert!(report.warnings.is_empty());
        assert!(!report.records[0].is_deleted);
    }

    #[test]
    fn test_header_reordering_tolerated() {
        // Swap the first two columns; values move with their headers.
        let input = "SequenceNumber,EntryNumber,ParentEntryNumber,InUse,ParentPath,FileName,\
                     Extension,IsDirectory,HasAds,IsCooled,LogicalSize,PhysicalSize,\
                     Created0x10,LastModified0x10,LastRecordChange0x10,LastAccess0x10,\
                     Created0x30,LastModified0x30,LastRecordChange0x30,LastAccess0x30\n\
                     3,77,5,True,C:\\data,f.txt,txt,False,False,False,12,4096,\
                     2023-06-01 10:00:00.0000000,2023-06-01 10:00:00.0000000,\
                     2023-06-01 10:00:00.0000000,2023-06-01 10:00:00.0000000,\
                     2023-06-01 10:00:00.0000000,2023-06-01 10:00:00.0000000,\
                     2023-06-01 10:00:00.0000000,2023-06-01 10:00:00.0000000";
        let report = load(input);

        assert_eq!(report.records[0].entry_id, 77);
        assert_eq!(report.records[0].sequence_number, 3);
    }

    #[test]
    fn test_missing_column_fails_load() {
        let result = Loader::new().load_reader("EntryNumber,FileName\n1,a.txt".as_bytes());
        assert!(matches!(result, Err(IngestError::MissingColumn(_))));
    }

    #[test]
    fn test_cancel_flag_aborts() {
        use std::sync::atomic::Ordering;

        let flag = Arc::new(AtomicBool::new(true));
        flag.store(true, Ordering::Relaxed);
        let input = format!("{CSV_HEADER}\n{}", csv_row(1, "a.txt", r"C:\x", 10));

        let result = Loader::new()
            .with_cancel_flag(flag)
            .load_reader(input.as_bytes());
        assert!(matches!(result, Err(IngestError::Aborted)));
    }

    #[test]
    fn test_extension_derived_from_name_when_column_empty() {
        let row = csv_row(12, "archive.ZIP", r"C:\tmp", 1).replace(",zip,", ",,");
        let report = load(&format!("{CSV_HEADER}\n{row}"));

        assert_eq!(report.records[0].extension, "zip");
    }
}
