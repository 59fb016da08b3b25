//! JSON snapshot files next to the test sources.
//!
//! The snapshots of `dir/name.rs` live in `dir/.snapshots/name.json`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use snappiershot_core::json;
use tracing::debug;

use crate::error::StorageError;
use crate::file::SnapshotFile;
use crate::traits::SnapshotStore;

/// Directory created next to test files to hold their snapshots.
pub const SNAPSHOT_DIRECTORY: &str = ".snapshots";

/// The only supported format name.
pub const JSON_FORMAT: &str = "JSON";

const JSON_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    indent: usize,
}

impl Default for JsonFileStore {
    fn default() -> Self {
        JsonFileStore { indent: 4 }
    }
}

impl JsonFileStore {
    /// A store writing files with `indent` spaces per level.
    pub fn new(indent: usize) -> Self {
        JsonFileStore { indent }
    }

    /// A store for a configured format name. Only `JSON` is supported.
    pub fn for_format(format: &str, indent: usize) -> Result<Self, StorageError> {
        if format != JSON_FORMAT {
            return Err(StorageError::UnsupportedFormat {
                format: format.to_string(),
            });
        }
        Ok(JsonFileStore::new(indent))
    }

    pub fn indent(&self) -> usize {
        self.indent
    }
}

fn check_extension(location: &Path) -> Result<(), StorageError> {
    match location.extension().and_then(|e| e.to_str()) {
        Some(JSON_EXTENSION) => Ok(()),
        other => Err(StorageError::UnsupportedFormat {
            format: other.map_or_else(|| "<none>".to_string(), |e| format!(".{}", e)),
        }),
    }
}

impl SnapshotStore for JsonFileStore {
    fn locate(&self, test_file: &Path) -> Result<PathBuf, StorageError> {
        let directory = match test_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !directory.is_dir() {
            return Err(StorageError::MissingDirectory {
                path: directory.to_path_buf(),
            });
        }
        let stem = test_file.file_stem().unwrap_or(test_file.as_os_str());
        let mut location = directory.join(SNAPSHOT_DIRECTORY).join(stem);
        location.set_extension(JSON_EXTENSION);
        Ok(location)
    }

    fn read(&self, location: &Path) -> Result<SnapshotFile, StorageError> {
        check_extension(location)?;
        if !location.exists() {
            debug!(path = %location.display(), "no snapshot file yet");
            return Ok(SnapshotFile::empty());
        }
        let text = fs::read_to_string(location).map_err(|e| StorageError::io(location, e))?;
        let tree = json::from_str(&text).map_err(|source| StorageError::Parse {
            path: location.to_path_buf(),
            source,
        })?;
        SnapshotFile::from_canonical(&tree).map_err(|reason| StorageError::InvalidFile {
            path: location.to_path_buf(),
            reason,
        })
    }

    /// Writes into a temporary file in the target directory, then renames it
    /// over the target. The temporary file is removed on any failure.
    fn write(&self, location: &Path, file: &SnapshotFile) -> Result<(), StorageError> {
        check_extension(location)?;
        let mut text = json::to_string_indented(&file.to_canonical(), self.indent)?;
        text.push('\n');

        let directory = match location.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(directory).map_err(|e| StorageError::io(directory, e))?;

        let mut temp =
            tempfile::NamedTempFile::new_in(directory).map_err(|e| StorageError::io(directory, e))?;
        temp.write_all(text.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| StorageError::io(temp.path(), e))?;
        temp.persist(location)
            .map_err(|e| StorageError::io(location, e.error))?;

        debug!(path = %location.display(), bytes = text.len(), "wrote snapshot file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snappiershot_core::{Canonical, Mapping};

    #[test]
    fn test_locate_next_to_test_file() {
        let dir = tempfile::tempdir().unwrap();
        let test_file = dir.path().join("test_math.rs");
        let location = JsonFileStore::default().locate(&test_file).unwrap();
        assert_eq!(location, dir.path().join(".snapshots").join("test_math.json"));
    }

    #[test]
    fn test_locate_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let test_file = dir.path().join("nope").join("test_math.rs");
        let err = JsonFileStore::default().locate(&test_file).unwrap_err();
        assert!(matches!(err, StorageError::MissingDirectory { .. }));
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFileStore::default()
            .read(&dir.path().join("x.json"))
            .unwrap();
        assert_eq!(file, SnapshotFile::empty());
    }

    #[test]
    fn test_unsupported_format_and_extension() {
        let err = JsonFileStore::for_format("YAML", 4).unwrap_err();
        assert_eq!(err.to_string(), "unsupported snapshot file format: YAML");

        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileStore::default()
            .read(&dir.path().join("x.yaml"))
            .unwrap_err();
        assert!(err.to_string().contains(".yaml"));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"tests": {}}"#).unwrap();
        let err = JsonFileStore::default().read(&path).unwrap_err();
        assert!(matches!(err, StorageError::InvalidFile { .. }));
        assert!(err.to_string().contains("snappiershot_version"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(2);
        let location = store.locate(&dir.path().join("test_io.rs")).unwrap();

        let mut file = SnapshotFile::empty();
        let (index, _) = file.find_or_insert("tests::test_io", Mapping::new(), |_| true);
        file.entry_mut("tests::test_io", index)
            .unwrap()
            .snapshots
            .push(Canonical::Float(f64::NAN));
        store.write(&location, &file).unwrap();

        let text = fs::read_to_string(&location).unwrap();
        assert!(text.starts_with("{\n  \"snappiershot_version\""));

        let back = store.read(&location).unwrap();
        let stored = &back.entry("tests::test_io", 0).unwrap().snapshots[0];
        assert!(stored.as_f64().unwrap().is_nan());

        let leftovers: Vec<_> = fs::read_dir(location.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path() != location)
            .collect();
        assert!(leftovers.is_empty());
    }
    #[test]
    fn test_reads_bare_non_finite_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_py.json");
        fs::write(
            &path,
            r#"{
    "snappiershot_version": "0.1.0",
    "tests": {
        "t": [
            {
                "metadata": {"update_on_next_run": false, "arguments": {}},
                "snapshots": [NaN, {"low": -Infinity, "note": "NaN"}]
            }
        ]
    }
}"#,
        )
        .unwrap();

        let file = JsonFileStore::default().read(&path).unwrap();
        let snapshots = &file.entry("t", 0).unwrap().snapshots;
        assert!(snapshots[0].as_f64().unwrap().is_nan());
        let map = snapshots[1].as_map().unwrap();
        assert_eq!(map.get("low"), Some(&Canonical::Float(f64::NEG_INFINITY)));
        assert_eq!(map.get("note"), Some(&Canonical::Str("NaN".into())));
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = dir.path().join(SNAPSHOT_DIRECTORY);
        // A non-empty directory in the way makes the final rename fail.
        let location = snapshots.join("test_io.json");
        fs::create_dir_all(&location).unwrap();
        fs::write(location.join("keep"), "").unwrap();

        let err = JsonFileStore::default()
            .write(&location, &SnapshotFile::empty())
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }), "{}", err);

        let entries: Vec<_> = fs::read_dir(&snapshots)
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.path())
            .collect();
        assert_eq!(entries, vec![location]);
    }
}
