use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::file::SnapshotFile;
use crate::traits::SnapshotStore;

/// A store that keeps snapshot files in memory. Meant for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<HashMap<PathBuf, SnapshotFile>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// The file stored at `location`, if any.
    pub fn get(&self, location: &Path) -> Option<SnapshotFile> {
        self.files.borrow().get(location).cloned()
    }

    pub fn insert(&self, location: impl Into<PathBuf>, file: SnapshotFile) {
        self.files.borrow_mut().insert(location.into(), file);
    }

    /// How many times `write` has been called.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl SnapshotStore for MemoryStore {
    fn locate(&self, test_file: &Path) -> Result<PathBuf, StorageError> {
        Ok(test_file.with_extension("json"))
    }

    fn read(&self, location: &Path) -> Result<SnapshotFile, StorageError> {
        Ok(self.get(location).unwrap_or_default())
    }

    fn write(&self, location: &Path, file: &SnapshotFile) -> Result<(), StorageError> {
        self.writes.set(self.writes.get() + 1);
        self.insert(location, file.clone());
        Ok(())
    }
}
