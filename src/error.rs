//! Error types for the media classifier

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media classifier operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media classifier
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Destination already exists: {destination}")]
    DestinationExists { destination: PathBuf },

    #[error("No tag support for {path}")]
    NoTagSupport { path: PathBuf },

    #[error("Unknown tag key '{key}' for {path}")]
    UnknownTagKey { path: PathBuf, key: String },

    #[error("Failed to access tags of {path}: {message}")]
    Tags { path: PathBuf, message: String },

    #[error("Exchange file {path} has no 'file' column")]
    MissingFileColumn { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
