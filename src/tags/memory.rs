//! In-memory tag store for tests

use super::lofty_store::COMMON_KEYS;
use super::{TagMap, TagStore};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub(crate) struct MemoryTagStore {
    files: RefCell<HashMap<PathBuf, TagMap>>,
    unsupported: HashSet<PathBuf>,
    broken: HashSet<PathBuf>,
    writes: RefCell<usize>,
}

impl MemoryTagStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_tags(self, path: impl Into<PathBuf>, tags: TagMap) -> Self {
        self.files.borrow_mut().insert(path.into(), tags);
        self
    }

    /// Files the store refuses to tag
    pub(crate) fn unsupported(mut self, path: impl Into<PathBuf>) -> Self {
        self.unsupported.insert(path.into());
        self
    }

    /// Files whose container fails to parse
    pub(crate) fn broken(mut self, path: impl Into<PathBuf>) -> Self {
        self.broken.insert(path.into());
        self
    }

    pub(crate) fn tags(&self, path: &Path) -> Option<TagMap> {
        self.files.borrow().get(path).cloned()
    }

    pub(crate) fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl TagStore for MemoryTagStore {
    fn read(&self, path: &Path) -> Result<Option<TagMap>> {
        if self.broken.contains(path) {
            return Err(Error::Tags {
                path: path.to_path_buf(),
                message: "corrupt container".into(),
            });
        }
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write(&self, path: &Path, tags: &TagMap) -> Result<()> {
        self.check(path, tags)?;

        let mut files = self.files.borrow_mut();
        let entry = files.entry(path.to_path_buf()).or_default();
        for (key, value) in tags {
            entry.insert(key.clone(), value.clone());
        }
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn check(&self, path: &Path, tags: &TagMap) -> Result<()> {
        if self.unsupported.contains(path) {
            return Err(Error::NoTagSupport {
                path: path.to_path_buf(),
            });
        }
        if self.broken.contains(path) {
            return Err(Error::Tags {
                path: path.to_path_buf(),
                message: "corrupt container".into(),
            });
        }
        match tags.keys().find(|key| !COMMON_KEYS.contains(&key.as_str())) {
            Some(key) => Err(Error::UnknownTagKey {
                path: path.to_path_buf(),
                key: key.clone(),
            }),
            None => Ok(()),
        }
    }
}
