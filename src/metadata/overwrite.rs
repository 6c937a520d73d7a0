//! Applying an edited exchange file back onto audio files
//!
//! Each CSV row names a file in its `file` column. Non-empty cells are
//! coerced with [`coerce_cell`] and written through the tag store. Rows
//! are independent: a failing row is logged and the next one is processed,
//! and nothing already written is rolled back.

use super::FILE_COLUMN;
use crate::error::{Error, Result};
use crate::tags::{TagMap, TagStore, coerce_cell};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span, warn};

/// Status of a single exchange-file row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// Tags were saved
    Written,
    /// Dry run - would have saved
    DryRun,
    /// Row was skipped (blank or missing file, nothing to write, no tag support, malformed row)
    Skipped,
    /// Opening, applying or saving failed
    Failed,
}

/// Result of processing one row
#[derive(Debug, Clone)]
pub struct RowResult {
    /// Line number in the exchange file (header is line 1)
    pub line: u64,
    /// Target file, if the row named one
    pub file: Option<PathBuf>,
    /// Coerced values for the row
    pub tags: TagMap,
    pub status: RowStatus,
    /// Reason for skipping or failing
    pub message: Option<String>,
}

/// Per-run counters
#[derive(Debug, Clone, Default)]
pub struct OverwriteStats {
    pub rows: usize,
    pub written: usize,
    pub dry_run: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl OverwriteStats {
    fn record(&mut self, status: RowStatus) {
        self.rows += 1;
        match status {
            RowStatus::Written => self.written += 1,
            RowStatus::DryRun => self.dry_run += 1,
            RowStatus::Skipped => self.skipped += 1,
            RowStatus::Failed => self.failed += 1,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Rows: {}, Written: {}, Dry run: {}, Skipped: {}, Failed: {}",
            self.rows, self.written, self.dry_run, self.skipped, self.failed
        )
    }
}

/// Writes edited exchange-file values back through a [`TagStore`]
pub struct MetadataOverwriter<'a, S: TagStore + ?Sized> {
    store: &'a S,
    dry_run: bool,
    stats: OverwriteStats,
}

impl<'a, S: TagStore + ?Sized> MetadataOverwriter<'a, S> {
    pub fn new(store: &'a S, dry_run: bool) -> Self {
        Self {
            store,
            dry_run,
            stats: OverwriteStats::default(),
        }
    }

    /// Apply every row of the CSV exchange file at `exchange_file`
    ///
    /// Fails only when the exchange file itself cannot be read or has no
    /// `file` column; row-level problems end up in the returned results.
    pub fn overwrite(&mut self, exchange_file: &Path) -> Result<Vec<RowResult>> {
        let _span = span!(Level::INFO, "overwrite_metadata", input = %exchange_file.display()).entered();

        let mut reader = csv::Reader::from_path(exchange_file)?;
        let headers = reader.headers()?.clone();
        let file_index = headers
            .iter()
            .position(|h| h == FILE_COLUMN)
            .ok_or_else(|| Error::MissingFileColumn {
                path: exchange_file.to_path_buf(),
            })?;

        let mut results = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let line = index as u64 + 2;
            let result = match row {
                Ok(row) => self.process_row(line, &headers, file_index, &row),
                Err(e) => {
                    warn!(line, error = %e, "Skipping malformed row");
                    RowResult {
                        line,
                        file: None,
                        tags: TagMap::new(),
                        status: RowStatus::Skipped,
                        message: Some(e.to_string()),
                    }
                }
            };

            self.stats.record(result.status);
            results.push(result);
        }

        info!("{}", self.stats.summary());
        Ok(results)
    }

    fn process_row(
        &self,
        line: u64,
        headers: &csv::StringRecord,
        file_index: usize,
        row: &csv::StringRecord,
    ) -> RowResult {
        let skipped = |file: Option<PathBuf>, message: &str| RowResult {
            line,
            file,
            tags: TagMap::new(),
            status: RowStatus::Skipped,
            message: Some(message.to_string()),
        };

        let file_cell = row.get(file_index).unwrap_or_default();
        if file_cell.is_empty() {
            warn!(line, "Row has no file, skipping");
            return skipped(None, "no file");
        }

        let path = PathBuf::from(file_cell);
        if !path.exists() {
            warn!(line, path = %path.display(), "File does not exist, skipping");
            return skipped(Some(path), "file does not exist");
        }

        let tags: TagMap = headers
            .iter()
            .zip(row.iter())
            .enumerate()
            .filter(|(column, _)| *column != file_index)
            .filter_map(|(_, (key, cell))| coerce_cell(cell).map(|value| (key.to_string(), value)))
            .collect();

        if tags.is_empty() {
            debug!(line, path = %path.display(), "No values to write");
            return skipped(Some(path), "no values");
        }

        // dry runs go through the same store validation as a save
        let outcome = if self.dry_run {
            self.store.check(&path, &tags)
        } else {
            self.store.write(&path, &tags)
        };

        let (status, message) = match outcome {
            Ok(()) if self.dry_run => {
                for (key, value) in &tags {
                    info!(dry_run = true, path = %path.display(), key = %key, value = %value, "Would set tag");
                }
                (RowStatus::DryRun, None)
            }
            Ok(()) => {
                info!(path = %path.display(), keys = tags.len(), "Updated metadata");
                (RowStatus::Written, None)
            }
            Err(e @ Error::NoTagSupport { .. }) => {
                warn!(path = %path.display(), "File has no tag support, skipping");
                (RowStatus::Skipped, Some(e.to_string()))
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to update metadata");
                (RowStatus::Failed, Some(e.to_string()))
            }
        };

        RowResult {
            line,
            file: Some(path),
            tags,
            status,
            message,
        }
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &OverwriteStats {
        &self.stats
    }
}
