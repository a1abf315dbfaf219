//! Immutable, indexed store for one loaded MFT table
//!
//! The store owns the finalized record sequence in load order and carries
//! auxiliary position indexes for the filter categories that profit from
//! them: extension membership and the four boolean attribute flags. Free-text
//! search and size/date ranges stay full-scan predicates; their selectivity
//! is unpredictable and an index would rarely beat a parallel scan.
//!
//! A store is frozen at [`RecordStore::build`] time. A rescan of the volume
//! is a fresh load producing a fresh store; queries hold `Arc` snapshots so
//! an in-flight query is never affected by a replacement.

use std::collections::HashMap;

use crate::record::MftRecord;

/// One of the precomputed boolean attribute indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeFlag {
    Directory,
    Deleted,
    HasAds,
    Cooled,
}

impl AttributeFlag {
    /// Whether `record` carries this flag
    #[must_use]
    pub const fn is_set(self, record: &MftRecord) -> bool {
        match self {
            Self::Directory => record.is_directory,
            Self::Deleted => record.is_deleted,
            Self::HasAds => record.has_ads,
            Self::Cooled => record.is_cooled,
        }
    }
}

/// Ordered, immutable record sequence plus position indexes
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<MftRecord>,
    /// lower-cased extension to ascending positions
    by_extension: HashMap<String, Vec<u32>>,
    directories: Vec<u32>,
    deleted: Vec<u32>,
    with_ads: Vec<u32>,
    cooled: Vec<u32>,
}

impl RecordStore {
    /// Freeze a record sequence into a store, building all indexes
    ///
    /// Records keep their input order; positions in every index are ascending
    /// by construction.
    #[must_use]
    pub fn build(records: Vec<MftRecord>) -> Self {
        let mut store = Self {
            records,
            ..Self::default()
        };

        for (position, record) in store.records.iter().enumerate() {
            let position = position as u32;
            // The empty extension is a key like any other, so an
            // extensionless-record criterion can enter through the index too.
            store
                .by_extension
                .entry(record.extension.clone())
                .or_default()
                .push(position);
            if record.is_directory {
                store.directories.push(position);
            }
            if record.is_deleted {
                store.deleted.push(position);
            }
            if record.has_ads {
                store.with_ads.push(position);
            }
            if record.is_cooled {
                store.cooled.push(position);
            }
        }

        store
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `position` in load order
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&MftRecord> {
        self.records.get(position)
    }

    /// All records, in load order
    #[must_use]
    pub fn records(&self) -> &[MftRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MftRecord> {
        self.records.iter()
    }

    /// Ascending positions of records with the given lower-cased extension
    #[must_use]
    pub fn extension_positions(&self, extension: &str) -> Option<&[u32]> {
        self.by_extension.get(extension).map(Vec::as_slice)
    }

    /// Ascending positions of records carrying `flag`
    #[must_use]
    pub fn flag_positions(&self, flag: AttributeFlag) -> &[u32] {
        match flag {
            AttributeFlag::Directory => &self.directories,
            AttributeFlag::Deleted => &self.deleted,
            AttributeFlag::HasAds => &self.with_ads,
            AttributeFlag::Cooled => &self.cooled,
        }
    }

    /// Iterate all indexed extensions with their record counts
    pub fn extension_counts(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_extension
            .iter()
            .map(|(ext, positions)| (ext.as_str(), positions.len()))
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a MftRecord;
    type IntoIter = std::slice::Iter<'a, MftRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
