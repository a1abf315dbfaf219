//! Testing utilities for mftsift
//!
//! Fixture builders for synthetic records and CSV rows, shared by the unit
//! tests. Only available when compiled with `cfg(test)`.

use chrono::{DateTime, Utc};

use crate::record::{MftRecord, Timestamps};

/// The full header row the loader expects, in canonical order
pub const CSV_HEADER: &str = "EntryNumber,SequenceNumber,ParentEntryNumber,InUse,ParentPath,\
                              FileName,Extension,IsDirectory,HasAds,IsCooled,LogicalSize,\
                              PhysicalSize,Created0x10,LastModified0x10,LastRecordChange0x10,\
                              LastAccess0x10,Created0x30,LastModified0x30,LastRecordChange0x30,\
                              LastAccess0x30";

/// One shape-valid CSV row for a live, non-directory file
///
/// Every timestamp cell carries a distinct literal so tests can rewrite a
/// single column with a plain string replace.
#[must_use]
pub fn csv_row(entry: u64, name: &str, parent: &str, logical_size: u64) -> String {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    format!(
        "{entry},1,5,True,{parent},{name},{extension},False,False,False,{logical_size},4096,\
         2023-06-01 10:00:00.0000000,2023-06-05 12:30:00.0000000,\
         2023-06-05 12:30:01.0000000,2023-06-07 08:15:00.0000000,\
         2023-06-01 10:00:00.0000001,2023-06-05 12:30:02.0000000,\
         2023-06-05 12:30:03.0000000,2023-06-07 08:15:01.0000000"
    )
}

/// Start building a synthetic record; extension is derived from `name`
#[must_use]
pub fn record(entry_id: u64, name: &str) -> RecordBuilder {
    RecordBuilder {
        record: MftRecord {
            entry_id,
            sequence_number: 1,
            parent_entry_id: Some(5),
            name: name.to_string(),
            parent_path: r"C:\fixture".to_string(),
            extension: name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
                .unwrap_or_default(),
            logical_size: 0,
            physical_size: 0,
            si_times: Timestamps::default(),
            fn_times: Timestamps::default(),
            is_directory: false,
            is_deleted: false,
            has_ads: false,
            is_cooled: false,
        },
    }
}

/// Builder for synthetic [`MftRecord`] fixtures
pub struct RecordBuilder {
    record: MftRecord,
}

impl RecordBuilder {
    #[must_use]
    pub fn parent(mut self, path: &str) -> Self {
        self.record.parent_path = path.to_string();
        self
    }

    #[must_use]
    pub const fn sizes(mut self, logical: u64, physical: u64) -> Self {
        self.record.logical_size = logical;
        self.record.physical_size = physical;
        self
    }

    #[must_use]
    pub const fn directory(mut self) -> Self {
        self.record.is_directory = true;
        self
    }

    #[must_use]
    pub const fn deleted(mut self) -> Self {
        self.record.is_deleted = true;
        self
    }

    #[must_use]
    pub const fn with_ads(mut self) -> Self {
        self.record.has_ads = true;
        self
    }

    #[must_use]
    pub const fn cooled(mut self) -> Self {
        self.record.is_cooled = true;
        self
    }

    #[must_use]
    pub const fn si_created(mut self, at: DateTime<Utc>) -> Self {
        self.record.si_times.created = Some(at);
        self
    }

    #[must_use]
    pub const fn fn_created(mut self, at: DateTime<Utc>) -> Self {
        self.record.fn_times.created = Some(at);
        self
    }

    #[must_use]
    pub const fn si_times(mut self, times: Timestamps) -> Self {
        self.record.si_times = times;
        self
    }

    #[must_use]
    pub const fn fn_times(mut self, times: Timestamps) -> Self {
        self.record.fn_times = times;
        self
    }

    #[must_use]
    pub fn build(self) -> MftRecord {
        self.record
    }
}
