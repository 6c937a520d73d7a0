//! Audio metadata round trip
//!
//! Tags are extracted from every audio file under a root into an
//! [`ExchangeTable`], written out as CSV or JSON for editing, and the
//! edited CSV is applied back onto the files.

pub mod export;
pub mod extract;
pub mod overwrite;

use crate::tags::TagMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::warn;

pub use extract::MetadataExtractor;
pub use overwrite::{MetadataOverwriter, OverwriteStats, RowResult, RowStatus};

/// Name of the column holding the audio file path
pub const FILE_COLUMN: &str = "file";

/// Tags of one audio file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub file: PathBuf,
    #[serde(flatten)]
    pub fields: TagMap,
}

impl MetadataRecord {
    pub fn new(file: impl Into<PathBuf>, fields: TagMap) -> Self {
        Self {
            file: file.into(),
            fields,
        }
    }
}

/// Records collected in one export run, keyed by file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeTable {
    records: Vec<MetadataRecord>,
    index: HashMap<PathBuf, usize>,
}

impl ExchangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; a second record for the same file replaces the first
    pub fn push(&mut self, record: MetadataRecord) {
        match self.index.get(&record.file) {
            Some(&position) => {
                warn!(file = %record.file.display(), "Duplicate record, keeping the latest");
                self.records[position] = record;
            }
            None => {
                self.index.insert(record.file.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted union of every field name plus the `file` column
    pub fn header(&self) -> Vec<String> {
        let mut columns: BTreeSet<&str> = BTreeSet::new();
        columns.insert(FILE_COLUMN);
        for record in &self.records {
            columns.extend(record.fields.keys().map(String::as_str));
        }
        columns.into_iter().map(str::to_string).collect()
    }
}

impl FromIterator<MetadataRecord> for ExchangeTable {
    fn from_iter<I: IntoIterator<Item = MetadataRecord>>(iter: I) -> Self {
        let mut table = ExchangeTable::new();
        for record in iter {
            table.push(record);
        }
        table
    }
}
