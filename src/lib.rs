//! Media Classifier - date-based video sorting and audio tag round trips
//!
//! This library provides:
//! - Top-down directory walking with folder pruning
//! - Classification of `YYYYMMDD_HHMMSS.<ext>` videos into `YYYY/MM/DD` folders
//! - Audio tag extraction through a pluggable tag store (lofty by default)
//! - CSV/JSON export of the collected tags
//! - Applying an edited CSV back onto the audio files
//! - Dry-run previews for every mutation

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod tags;
pub mod walk;

pub use classify::{ClassificationResult, MatchedDate, MoveStatus, VideoClassifier};
pub use cli::Cli;
pub use config::{Config, ConfigError, ExportFormat};
pub use error::{Error, Result};
pub use logging::{LogSettings, LogSink, Verbosity};
pub use metadata::{ExchangeTable, MetadataExtractor, MetadataOverwriter, MetadataRecord};
pub use tags::{LoftyTagStore, TagMap, TagStore, TagValue};
pub use walk::{DirListing, TraversalConfig, walk};
