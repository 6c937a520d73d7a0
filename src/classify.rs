//! Date-based video classification
//!
//! Handles the core logic of:
//! - Selecting video files from each walked directory
//! - Deriving `root/YYYY/MM/DD` from a `YYYYMMDD_HHMMSS.<ext>` file name
//! - Falling back to a fixed folder for every other video
//! - Moving the file (or reporting the move in dry-run mode)

use crate::config::Config;
use crate::error::{Error, Result};
use crate::walk::{TraversalConfig, walk};

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span};

/// Date captured from a video file name, kept exactly as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedDate {
    pub year: String,
    pub month: String,
    pub day: String,
}

/// Where a video belongs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub source_path: PathBuf,
    pub destination_folder: PathBuf,
    pub destination_path: PathBuf,
    pub matched_date: Option<MatchedDate>,
}

/// Status of a single video after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    /// File was moved into its destination folder
    Moved,
    /// Dry run - would have moved
    DryRun,
    /// Source already is the destination, nothing to do
    AlreadyInPlace,
    /// Move failed
    Failed,
}

/// Result of processing a single video
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Computed destination path
    pub destination: PathBuf,
    /// Date used for the destination, if the name carried one
    pub matched_date: Option<MatchedDate>,
    /// Processing status
    pub status: MoveStatus,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Per-run counters
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub moved: usize,
    pub dry_run: usize,
    pub in_place: usize,
    pub failed: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, status: MoveStatus) {
        self.total_files += 1;
        match status {
            MoveStatus::Moved => self.moved += 1,
            MoveStatus::DryRun => self.dry_run += 1,
            MoveStatus::AlreadyInPlace => self.in_place += 1,
            MoveStatus::Failed => self.failed += 1,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Moved: {}, Dry run: {}, Already in place: {}, Failed: {}",
            self.total_files, self.moved, self.dry_run, self.in_place, self.failed
        )
    }
}

/// Sorts videos below a root directory into date folders
pub struct VideoClassifier {
    traversal: TraversalConfig,
    config: Config,
    date_pattern: Regex,
    stats: ProcessingStats,
}

impl VideoClassifier {
    /// Create a classifier for the tree described by `traversal`
    pub fn new(traversal: TraversalConfig, config: &Config) -> Result<Self> {
        if config.fallback_folder.is_empty() {
            return Err(Error::Config("fallback folder name is empty".into()));
        }

        Ok(Self {
            traversal,
            date_pattern: build_date_pattern(&config.video_extensions)?,
            config: config.clone(),
            stats: ProcessingStats::new(),
        })
    }

    /// Root directory that destinations are computed from
    pub fn root(&self) -> &Path {
        &self.traversal.root
    }

    /// Decide where `file_name` (found in `directory`) belongs
    ///
    /// Returns `None` for files that are not videos or that fail the name
    /// pattern filter; those are left alone.
    pub fn classify(&self, directory: &Path, file_name: &str) -> Option<ClassificationResult> {
        if !self.config.is_video(file_name) {
            return None;
        }
        if !self.traversal.matches_name(file_name) {
            return None;
        }

        let root = self.root();
        let (destination_folder, matched_date) = match self.match_date(file_name) {
            Some(date) => (
                root.join(&date.year).join(&date.month).join(&date.day),
                Some(date),
            ),
            None => (root.join(&self.config.fallback_folder), None),
        };

        Some(ClassificationResult {
            source_path: directory.join(file_name),
            destination_path: destination_folder.join(file_name),
            destination_folder,
            matched_date,
        })
    }

    /// Match `YYYYMMDD_HHMMSS.<ext>` anchored at the start of the name
    pub fn match_date(&self, file_name: &str) -> Option<MatchedDate> {
        let caps = self.date_pattern.captures(file_name)?;
        Some(MatchedDate {
            year: caps.get(1)?.as_str().to_string(),
            month: caps.get(2)?.as_str().to_string(),
            day: caps.get(3)?.as_str().to_string(),
        })
    }

    /// Create the destination folder and move the file, or report both in dry-run mode
    pub fn apply(&self, result: &ClassificationResult) -> Result<MoveStatus> {
        if is_same_location(&result.source_path, &result.destination_path) {
            debug!(path = %result.source_path.display(), "File already at its destination");
            return Ok(MoveStatus::AlreadyInPlace);
        }

        if !result.destination_folder.exists() {
            if self.config.dry_run {
                info!(
                    dry_run = true,
                    directory = %result.destination_folder.display(),
                    "Would create directory"
                );
            } else {
                fs::create_dir_all(&result.destination_folder)?;
                debug!(directory = %result.destination_folder.display(), "Created directory");
            }
        }

        // rename() replaces existing files on Unix, so collisions are checked up front
        if result.destination_path.exists() {
            return Err(Error::DestinationExists {
                destination: result.destination_path.clone(),
            });
        }

        if self.config.dry_run {
            info!(
                dry_run = true,
                source = %result.source_path.display(),
                destination = %result.destination_path.display(),
                "Would move file"
            );
            return Ok(MoveStatus::DryRun);
        }

        info!(
            source = %result.source_path.display(),
            destination = %result.destination_path.display(),
            "Moving file"
        );
        fs::rename(&result.source_path, &result.destination_path)?;
        Ok(MoveStatus::Moved)
    }

    /// Classify and move every eligible video in the tree
    pub fn run(&mut self) -> Vec<FileResult> {
        let _span = span!(Level::INFO, "sort_videos", root = %self.root().display()).entered();

        let mut results = Vec::new();
        for listing in walk(&self.traversal) {
            debug!(directory = %listing.directory.display(), files = listing.files.len(), "Scanning directory");

            for file_name in &listing.files {
                let Some(classification) = self.classify(&listing.directory, file_name) else {
                    continue;
                };

                let file_result = match self.apply(&classification) {
                    Ok(status) => FileResult {
                        source: classification.source_path,
                        destination: classification.destination_path,
                        matched_date: classification.matched_date,
                        status,
                        error: None,
                    },
                    Err(e) => {
                        error!(
                            source = %classification.source_path.display(),
                            destination = %classification.destination_path.display(),
                            error = %e,
                            "Failed to move file"
                        );
                        FileResult {
                            source: classification.source_path,
                            destination: classification.destination_path,
                            matched_date: classification.matched_date,
                            status: MoveStatus::Failed,
                            error: Some(e.to_string()),
                        }
                    }
                };

                self.stats.record(file_result.status);
                results.push(file_result);
            }
        }

        info!("{}", self.stats.summary());
        results
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }
}

/// Build the anchored date pattern for the given video extensions
fn build_date_pattern(extensions: &[String]) -> Result<Regex> {
    let alternatives = extensions
        .iter()
        .map(|ext| regex::escape(ext))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?i)^(\d{{4}})(\d{{2}})(\d{{2}})_\d{{6}}\.(?:{})$", alternatives);
    Ok(Regex::new(&pattern)?)
}

fn is_same_location(source: &Path, destination: &Path) -> bool {
    if source == destination {
        return true;
    }
    match (fs::canonicalize(source), fs::canonicalize(destination)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"video").unwrap();
    }

    fn classifier(root: &Path, dry_run: bool) -> VideoClassifier {
        let config = Config {
            dry_run,
            ..Config::default()
        };
        VideoClassifier::new(TraversalConfig::new(root), &config).unwrap()
    }

    #[test]
    fn test_date_named_video_goes_to_day_folder() {
        let classifier = classifier(Path::new("/media"), true);
        let result = classifier
            .classify(Path::new("/media"), "20230115_141500.mp4")
            .unwrap();

        assert_eq!(result.destination_folder, PathBuf::from("/media/2023/01/15"));
        assert_eq!(
            result.destination_path,
            PathBuf::from("/media/2023/01/15/20230115_141500.mp4")
        );
        assert_eq!(
            result.matched_date,
            Some(MatchedDate {
                year: "2023".into(),
                month: "01".into(),
                day: "15".into(),
            })
        );
    }

    #[test]
    fn test_other_videos_go_to_fallback() {
        let classifier = classifier(Path::new("/media"), true);
        let result = classifier.classify(Path::new("/media/sub"), "random.mkv").unwrap();

        assert_eq!(result.source_path, PathBuf::from("/media/sub/random.mkv"));
        assert_eq!(result.destination_path, PathBuf::from("/media/SortedVideos/random.mkv"));
        assert!(result.matched_date.is_none());
    }

    #[test]
    fn test_match_is_anchored_at_start() {
        let classifier = classifier(Path::new("/media"), true);
        assert!(classifier.match_date("VID_20230115_141500.mp4").is_none());
        assert!(classifier.match_date("x20230115_141500.mp4").is_none());
        assert!(classifier.match_date("20230115_141500_1.mp4").is_none());
        assert!(classifier.match_date("20230115-141500.mp4").is_none());
        assert!(classifier.match_date("20230115_141500.MOV").is_some());
    }

    #[test]
    fn test_date_groups_are_not_validated() {
        let classifier = classifier(Path::new("/media"), true);
        let result = classifier
            .classify(Path::new("/media"), "20231399_000000.avi")
            .unwrap();
        assert_eq!(result.destination_folder, PathBuf::from("/media/2023/13/99"));
    }

    #[test]
    fn test_non_videos_and_pattern_misses_are_skipped() {
        let config = Config::default();
        let traversal = TraversalConfig {
            name_pattern: Some("holiday".into()),
            ..TraversalConfig::new("/media")
        };
        let classifier = VideoClassifier::new(traversal, &config).unwrap();

        assert!(classifier.classify(Path::new("/media"), "song.mp3").is_none());
        assert!(classifier.classify(Path::new("/media"), "work.mp4").is_none());
        assert!(classifier.classify(Path::new("/media"), "holiday.MKV").is_some());
    }

    #[test]
    fn test_configured_video_extensions() {
        let config = Config {
            video_extensions: vec!["webm".into()],
            ..Config::default()
        };
        let classifier = VideoClassifier::new(TraversalConfig::new("/media"), &config).unwrap();

        let result = classifier.classify(Path::new("/media"), "20230115_141500.WEBM").unwrap();
        assert_eq!(result.destination_folder, PathBuf::from("/media/2023/01/15"));
        assert!(classifier.classify(Path::new("/media"), "20230115_141500.mp4").is_none());
    }

    #[test]
    fn test_run_moves_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("20230115_141500.mp4"));
        touch(&root.join("random.mkv"));
        touch(&root.join("notes.txt"));

        let mut classifier = classifier(root, false);
        let results = classifier.run();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == MoveStatus::Moved));
        assert!(root.join("2023/01/15/20230115_141500.mp4").is_file());
        assert!(root.join("SortedVideos/random.mkv").is_file());
        assert!(root.join("notes.txt").is_file());
        assert!(!root.join("random.mkv").exists());
        assert_eq!(classifier.stats().moved, 2);
    }

    #[test]
    fn test_dry_run_leaves_tree_untouched() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("20230115_141500.mp4"));
        touch(&root.join("random.mkv"));

        let mut classifier = classifier(root, true);
        let results = classifier.run();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == MoveStatus::DryRun));
        assert!(root.join("20230115_141500.mp4").is_file());
        assert!(root.join("random.mkv").is_file());
        assert!(!root.join("2023").exists());
        assert!(!root.join("SortedVideos").exists());
    }

    #[test]
    fn test_collision_fails_without_overwriting() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("sub").join("clip.mp4"));
        fs::create_dir_all(root.join("SortedVideos")).unwrap();
        fs::write(root.join("SortedVideos").join("clip.mp4"), b"existing").unwrap();

        let traversal = TraversalConfig {
            recursive: true,
            ignore_folders: HashSet::from(["SortedVideos".to_string()]),
            ..TraversalConfig::new(root)
        };
        let mut classifier = VideoClassifier::new(traversal, &Config::default()).unwrap();
        let results = classifier.run();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, MoveStatus::Failed);
        assert!(results[0].error.is_some());
        assert!(root.join("sub").join("clip.mp4").is_file());
        assert_eq!(fs::read(root.join("SortedVideos").join("clip.mp4")).unwrap(), b"existing");
    }

    #[test]
    fn test_already_sorted_tree_is_a_no_op() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("2023/01/15/20230115_141500.mp4"));
        touch(&root.join("SortedVideos/random.mkv"));

        let traversal = TraversalConfig {
            recursive: true,
            ..TraversalConfig::new(root)
        };
        let mut classifier = VideoClassifier::new(traversal, &Config::default()).unwrap();
        let results = classifier.run();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == MoveStatus::AlreadyInPlace));
        assert!(root.join("2023/01/15/20230115_141500.mp4").is_file());
        assert!(root.join("SortedVideos/random.mkv").is_file());
    }

    #[test]
    fn test_processing_stats_summary() {
        let mut stats = ProcessingStats::new();
        stats.record(MoveStatus::Moved);
        stats.record(MoveStatus::Failed);
        stats.record(MoveStatus::AlreadyInPlace);

        let summary = stats.summary();
        assert!(summary.contains("Total: 3"));
        assert!(summary.contains("Moved: 1"));
        assert!(summary.contains("Failed: 1"));
    }
}
