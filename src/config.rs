//! Configuration types for the media classifier

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::walk::TraversalConfig;

/// Name of the folder that receives videos without a date in their name
pub const DEFAULT_FALLBACK_FOLDER: &str = "SortedVideos";

/// Exchange file format for metadata export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma separated values with a sorted, padded header
    #[default]
    Csv,
    /// Array of per-track objects
    Json,
}

impl ExportFormat {
    /// File extension used for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Default output file name (`music_metadata.<ext>`)
    pub fn default_output(&self) -> PathBuf {
        PathBuf::from(format!("music_metadata.{}", self.extension()))
    }
}

/// Configuration for the media classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder names that are never descended into
    pub ignore_folders: Vec<String>,

    /// Descend into subdirectories of the root
    pub recursive: bool,

    /// Dry run mode - report intended changes without applying them
    pub dry_run: bool,

    /// Verbose (debug) logging
    pub verbose: bool,

    /// Output log records as JSON
    pub json_log: bool,

    /// Write timestamped log files into this directory instead of stderr
    pub log_dir: Option<PathBuf>,

    /// Folder (under the root) for videos whose name carries no date
    pub fallback_folder: String,

    /// Exchange format used by metadata export
    pub export_format: ExportFormat,

    /// Extensions considered videos by the classifier
    pub video_extensions: Vec<String>,

    /// Extensions considered audio files by the metadata extractor
    pub audio_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_folders: vec![],
            recursive: false,
            dry_run: false,
            verbose: false,
            json_log: false,
            log_dir: None,
            fallback_folder: DEFAULT_FALLBACK_FOLDER.to_string(),
            export_format: ExportFormat::default(),
            video_extensions: vec!["mp4".into(), "avi".into(), "mkv".into(), "mov".into()],
            audio_extensions: vec!["mp3".into(), "flac".into()],
        }
    }
}

impl Config {
    /// Check if a file name ends with one of the video extensions (case-insensitive)
    pub fn is_video(&self, file_name: &str) -> bool {
        has_extension(file_name, &self.video_extensions)
    }

    /// Check if a file name ends with one of the audio extensions (case-insensitive)
    pub fn is_audio(&self, file_name: &str) -> bool {
        has_extension(file_name, &self.audio_extensions)
    }

    /// Build the traversal settings for a root directory
    pub fn traversal(&self, root: impl Into<PathBuf>, name_pattern: Option<String>) -> TraversalConfig {
        TraversalConfig {
            root: root.into(),
            ignore_folders: self.ignore_folders.iter().cloned().collect(),
            recursive: self.recursive,
            name_pattern: name_pattern.filter(|p| !p.is_empty()),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Write the sample configuration to `path`, creating parent directories
    pub fn write_sample_config<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_error = |e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, Self::sample_config()).map_err(write_error)
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Media Classifier Configuration File
# This file uses TOML format (https://toml.io)

# Folder names that are skipped during traversal (matched by name, any depth)
ignore_folders = [
    ".sync",
    "@eaDir",
]

# Descend into subdirectories of the root
recursive = false

# Dry run mode - show what would be done without actually doing it
dry_run = false

# Verbose output - show debug information
verbose = false

# Emit log records as JSON
json_log = false

# Directory for timestamped log files (logs go to stderr when unset)
# log_dir = "logs"

# Folder under the root for videos whose name does not start with YYYYMMDD_HHMMSS
fallback_folder = "SortedVideos"

# Exchange format for export-metadata: "csv" or "json"
export_format = "csv"

# Recognized extensions (matched case-insensitively)
video_extensions = ["mp4", "avi", "mkv", "mov"]
audio_extensions = ["mp3", "flac"]
"#
        .to_string()
    }
}

fn has_extension(file_name: &str, extensions: &[String]) -> bool {
    let lower = file_name.to_lowercase();
    extensions
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext.to_lowercase())))
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_extension_checks_are_case_insensitive() {
        let config = Config::default();
        assert!(config.is_video("clip.MP4"));
        assert!(config.is_video("clip.mkv"));
        assert!(!config.is_video("clip.wmv"));
        assert!(config.is_audio("song.FLAC"));
        assert!(!config.is_audio("song.ogg"));
    }

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::sample_config()).unwrap();
        assert_eq!(config.fallback_folder, DEFAULT_FALLBACK_FOLDER);
        assert_eq!(config.export_format, ExportFormat::Csv);
        assert_eq!(config.ignore_folders, vec![".sync", "@eaDir"]);
    }

    #[test]
    fn test_write_sample_config_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf").join("classifier.toml");

        Config::write_sample_config(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.ignore_folders, vec![".sync", "@eaDir"]);
        assert_eq!(loaded.export_format, ExportFormat::Csv);
    }

    #[test]
    fn test_write_sample_config_reports_write_error() {
        let dir = tempdir().unwrap();
        let result = Config::write_sample_config(dir.path());
        assert!(matches!(result, Err(ConfigError::WriteError { .. })));
    }

    #[test]
    fn test_load_reports_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "recursive = maybe").unwrap();
        assert!(matches!(Config::load_from_file(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("recursive = true").unwrap();
        assert!(config.recursive);
        assert_eq!(config.video_extensions.len(), 4);
    }

    #[test]
    fn test_traversal_drops_empty_pattern() {
        let config = Config::default();
        let traversal = config.traversal("/media", Some(String::new()));
        assert!(traversal.name_pattern.is_none());
        assert_eq!(traversal.root, PathBuf::from("/media"));
    }

    #[test]
    fn test_default_output_name() {
        assert_eq!(ExportFormat::Csv.default_output(), PathBuf::from("music_metadata.csv"));
        assert_eq!(ExportFormat::Json.default_output(), PathBuf::from("music_metadata.json"));
    }
}
