//! Core record types for one parsed $MFT table entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the four NTFS timestamps is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampKind {
    /// File creation time
    Created,
    /// Last content modification time
    Modified,
    /// Last MFT record change time
    EntryModified,
    /// Last access time
    Accessed,
}

impl TimestampKind {
    /// All four kinds, in the order the upstream converter emits them
    pub const ALL: [Self; 4] = [
        Self::Created,
        Self::Modified,
        Self::EntryModified,
        Self::Accessed,
    ];
}

impl std::fmt::Display for TimestampKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::EntryModified => "entry-modified",
            Self::Accessed => "accessed",
        };
        write!(f, "{name}")
    }
}

/// Which attribute the timestamp group was read from
///
/// Every MFT entry carries the same four timestamps twice: once in
/// $STANDARD_INFORMATION (trivially settable from user mode) and once in
/// $FILE_NAME (only updated by the kernel). Comparing the two is the basis
/// of timestomp detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// $STANDARD_INFORMATION (0x10)
    StandardInfo,
    /// $FILE_NAME (0x30)
    FileName,
}

impl std::fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StandardInfo => write!(f, "$SI"),
            Self::FileName => write!(f, "$FN"),
        }
    }
}

/// One group of four timestamps from a single attribute source
///
/// Each field is independently nullable: deleted entries and partially
/// recovered records routinely lack some or all of them. A missing value
/// never satisfies a bounded date filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub entry_modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
}

impl Timestamps {
    /// Look up one timestamp by kind
    #[must_use]
    pub const fn get(&self, kind: TimestampKind) -> Option<DateTime<Utc>> {
        match kind {
            TimestampKind::Created => self.created,
            TimestampKind::Modified => self.modified,
            TimestampKind::EntryModified => self.entry_modified,
            TimestampKind::Accessed => self.accessed,
        }
    }
}

/// One parsed MFT table entry, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MftRecord {
    /// Table entry index; unique within one load, not across volumes
    pub entry_id: u64,
    /// Reuse counter for the entry slot
    pub sequence_number: u16,
    /// Entry index of the containing directory, when resolved
    pub parent_entry_id: Option<u64>,
    /// Final path component
    pub name: String,
    /// Full path of the containing directory; empty when unresolved
    pub parent_path: String,
    /// Lower-cased extension without the leading dot; empty when none
    pub extension: String,
    /// File content size in bytes
    pub logical_size: u64,
    /// Allocated size in bytes; independent of `logical_size` (sparse and
    /// compressed files can have either larger)
    pub physical_size: u64,
    /// Timestamps from $STANDARD_INFORMATION
    pub si_times: Timestamps,
    /// Timestamps from $FILE_NAME
    pub fn_times: Timestamps,
    pub is_directory: bool,
    /// Entry is marked not-in-use (the file was deleted)
    pub is_deleted: bool,
    /// A named alternate data stream is present
    pub has_ads: bool,
    /// Opaque archival/infrequent-access flag copied verbatim from the input
    pub is_cooled: bool,
}

impl MftRecord {
    /// Look up one timestamp by source and kind
    #[must_use]
    pub const fn timestamp(
        &self,
        source: TimestampSource,
        kind: TimestampKind,
    ) -> Option<DateTime<Utc>> {
        match source {
            TimestampSource::StandardInfo => self.si_times.get(kind),
            TimestampSource::FileName => self.fn_times.get(kind),
        }
    }

    /// Parent path and name joined with a backslash, for display
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.parent_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}\\{}", self.parent_path, self.name)
        }
    }
}
