//! Directory traversal
//!
//! Walks a root directory top-down and yields one listing per directory:
//! the directory path plus the names of the files directly inside it.
//! Ignored folder names are pruned before descending, so nothing below
//! them is ever read.

use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Settings for a single traversal
#[derive(Debug, Clone, Default)]
pub struct TraversalConfig {
    /// Directory to start from
    pub root: PathBuf,
    /// Folder names that are never entered
    pub ignore_folders: HashSet<String>,
    /// Descend below the root
    pub recursive: bool,
    /// Substring a file name must contain to be considered
    pub name_pattern: Option<String>,
}

impl TraversalConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// True if the file name passes the optional substring filter
    pub fn matches_name(&self, file_name: &str) -> bool {
        match &self.name_pattern {
            Some(pattern) => file_name.contains(pattern.as_str()),
            None => true,
        }
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.ignore_folders.contains(name))
    }
}

/// Files found directly inside one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub directory: PathBuf,
    pub files: Vec<String>,
}

impl DirListing {
    fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            files: Vec::new(),
        }
    }

    /// Full paths of the listed files
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.files.iter().map(|name| self.directory.join(name))
    }
}

/// Lazy top-down directory walker
///
/// Entries inside each directory are ordered files-first, so a listing is
/// complete as soon as the next directory entry shows up.
pub struct TreeWalker {
    entries: Box<dyn Iterator<Item = walkdir::Result<DirEntry>>>,
    pending: Option<DirListing>,
}

/// Start walking the tree described by `config`
pub fn walk(config: &TraversalConfig) -> TreeWalker {
    let filter = config.clone();
    let recursive = config.recursive;

    let entries = WalkDir::new(&config.root)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()))
        .into_iter()
        .filter_entry(move |entry| {
            if entry.depth() > 0 && entry.file_type().is_dir() && !recursive {
                return false;
            }
            if filter.is_ignored(entry) {
                debug!(path = %entry.path().display(), "Skipping ignored folder");
                return false;
            }
            true
        });

    TreeWalker {
        entries: Box::new(entries),
        pending: None,
    }
}

impl Iterator for TreeWalker {
    type Item = DirListing;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.entries.next() {
                None => return self.pending.take(),
                Some(Err(e)) => {
                    warn!(path = ?e.path(), error = %e, "Skipping unreadable entry");
                    // walkdir yields a directory before failing to read it
                    if self
                        .pending
                        .as_ref()
                        .is_some_and(|listing| Some(listing.directory.as_path()) == e.path())
                    {
                        self.pending = None;
                    }
                }
                Some(Ok(entry)) => {
                    if entry.file_type().is_dir() {
                        let listing = DirListing::new(entry.into_path());
                        if let Some(done) = self.pending.replace(listing) {
                            return Some(done);
                        }
                    } else if let Some(listing) = self.pending.as_mut() {
                        match entry.file_name().to_str() {
                            Some(name) => listing.files.push(name.to_string()),
                            None => {
                                warn!(path = %entry.path().display(), "Skipping non UTF-8 file name")
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    #[test]
    fn test_non_recursive_yields_only_root() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.mp4"));
        touch(&dir.path().join("b.txt"));
        touch(&dir.path().join("sub").join("c.mp4"));
        touch(&dir.path().join("sub").join("deeper").join("d.mp4"));

        let listings: Vec<_> = walk(&TraversalConfig::new(dir.path())).collect();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].directory, dir.path());
        assert_eq!(sorted(listings[0].files.clone()), vec!["a.mp4", "b.txt"]);
    }

    #[test]
    fn test_recursive_visits_top_down() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.mp4"));
        touch(&dir.path().join("sub").join("c.mp4"));
        touch(&dir.path().join("sub").join("deeper").join("d.mp4"));

        let config = TraversalConfig {
            recursive: true,
            ..TraversalConfig::new(dir.path())
        };
        let listings: Vec<_> = walk(&config).collect();

        let dirs: Vec<_> = listings.iter().map(|l| l.directory.clone()).collect();
        assert_eq!(
            dirs,
            vec![
                dir.path().to_path_buf(),
                dir.path().join("sub"),
                dir.path().join("sub").join("deeper"),
            ]
        );
        assert_eq!(listings[1].files, vec!["c.mp4"]);
        assert_eq!(listings[2].files, vec!["d.mp4"]);
    }

    #[test]
    fn test_ignored_folders_are_pruned() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("keep").join("a.mp4"));
        touch(&dir.path().join("skip").join("b.mp4"));
        touch(&dir.path().join("skip").join("nested").join("c.mp4"));
        touch(&dir.path().join("keep").join("skip").join("d.mp4"));

        let config = TraversalConfig {
            recursive: true,
            ignore_folders: HashSet::from(["skip".to_string()]),
            ..TraversalConfig::new(dir.path())
        };
        let dirs: Vec<_> = walk(&config).map(|l| l.directory).collect();

        assert_eq!(dirs.len(), 2);
        assert!(dirs.iter().all(|d| !d.components().any(|c| c.as_os_str() == "skip")));
    }

    #[test]
    fn test_listing_paths_join_directory() {
        let listing = DirListing {
            directory: PathBuf::from("/media"),
            files: vec!["a.mp4".into()],
        };
        assert_eq!(listing.paths().collect::<Vec<_>>(), vec![PathBuf::from("/media/a.mp4")]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = tempdir().unwrap();
        let config = TraversalConfig::new(dir.path().join("missing"));
        assert_eq!(walk(&config).count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.mp4"));
        touch(&dir.path().join("locked").join("hidden.mp4"));
        touch(&dir.path().join("open").join("b.mp4"));

        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // running with privileges that ignore permissions
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let config = TraversalConfig {
            recursive: true,
            ..TraversalConfig::new(dir.path())
        };
        let listings: Vec<_> = walk(&config).collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let dirs: Vec<_> = listings.iter().map(|l| l.directory.clone()).collect();
        assert_eq!(dirs, vec![dir.path().to_path_buf(), dir.path().join("open")]);
        assert_eq!(listings[0].files, vec!["a.mp4"]);
        assert_eq!(listings[1].files, vec!["b.mp4"]);
    }

    #[test]
    fn test_matches_name() {
        let mut config = TraversalConfig::new("/media");
        assert!(config.matches_name("anything.mp4"));
        config.name_pattern = Some("2023".into());
        assert!(config.matches_name("20230115_141500.mp4"));
        assert!(!config.matches_name("random.mkv"));
    }
}
