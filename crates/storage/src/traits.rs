use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::file::SnapshotFile;

/// The backing store for snapshot files.
///
/// A session calls these in order: `locate` once per test file, `read` when
/// the first assertion runs and `write` at most once when the session exits.
///
/// ## Atomicity
///
/// `write` must replace the previous contents atomically: either the old
/// file or the complete new file is visible, never a partial one.
///
/// ## Concurrency
///
/// Stores make no promise about concurrent writers to the same location.
/// Serialize test processes per file if that matters.
pub trait SnapshotStore {
    /// Where the snapshots of tests defined in `test_file` live.
    fn locate(&self, test_file: &Path) -> Result<PathBuf, StorageError>;

    /// Read the file at `location`, or the empty default if there is none.
    fn read(&self, location: &Path) -> Result<SnapshotFile, StorageError>;

    /// Persist `file` at `location`.
    fn write(&self, location: &Path, file: &SnapshotFile) -> Result<(), StorageError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn locate(&self, test_file: &Path) -> Result<PathBuf, StorageError> {
        (**self).locate(test_file)
    }

    fn read(&self, location: &Path) -> Result<SnapshotFile, StorageError> {
        (**self).read(location)
    }

    fn write(&self, location: &Path, file: &SnapshotFile) -> Result<(), StorageError> {
        (**self).write(location, file)
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn locate(&self, test_file: &Path) -> Result<PathBuf, StorageError> {
        (**self).locate(test_file)
    }

    fn read(&self, location: &Path) -> Result<SnapshotFile, StorageError> {
        (**self).read(location)
    }

    fn write(&self, location: &Path, file: &SnapshotFile) -> Result<(), StorageError> {
        (**self).write(location, file)
    }
}
