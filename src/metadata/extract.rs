//! Metadata extraction from audio files

use super::{ExchangeTable, MetadataRecord};
use crate::config::Config;
use crate::tags::{TagMap, TagStore};
use crate::walk::{TraversalConfig, walk};
use std::path::Path;
use tracing::{Level, debug, info, span, warn};

/// Pulls tag mappings out of audio files through a [`TagStore`]
pub struct MetadataExtractor<'a, S: TagStore + ?Sized> {
    store: &'a S,
    config: Config,
}

impl<'a, S: TagStore + ?Sized> MetadataExtractor<'a, S> {
    pub fn new(store: &'a S, config: &Config) -> Self {
        Self {
            store,
            config: config.clone(),
        }
    }

    /// Check if a file name carries one of the audio extensions
    pub fn is_eligible(&self, file_name: &str) -> bool {
        self.config.is_audio(file_name)
    }

    /// Tags of a single file
    ///
    /// Files without tags and files the store fails on are logged and
    /// yield `None`.
    pub fn extract(&self, path: &Path) -> Option<TagMap> {
        match self.store.read(path) {
            Ok(Some(tags)) => {
                debug!(path = %path.display(), fields = tags.len(), "Extracted metadata");
                Some(tags)
            }
            Ok(None) => {
                warn!(path = %path.display(), "No metadata found");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read metadata");
                None
            }
        }
    }

    /// Extract every eligible audio file in the tree
    pub fn collect(&self, traversal: &TraversalConfig) -> ExchangeTable {
        let _span = span!(Level::INFO, "collect_metadata", root = %traversal.root.display()).entered();

        let mut table = ExchangeTable::new();
        for listing in walk(traversal) {
            for file_name in &listing.files {
                if !self.is_eligible(file_name) || !traversal.matches_name(file_name) {
                    continue;
                }

                let path = listing.directory.join(file_name);
                if let Some(fields) = self.extract(&path) {
                    table.push(MetadataRecord::new(path, fields));
                }
            }
        }

        info!(records = table.len(), "Collected metadata");
        table
    }
}
