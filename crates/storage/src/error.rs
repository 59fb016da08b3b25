use std::path::PathBuf;

/// All errors that can be returned by a SnapshotStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The configured format, or a snapshot file's extension, is not supported.
    #[error("unsupported snapshot file format: {format}")]
    UnsupportedFormat { format: String },

    /// A snapshot file lacks a required key or has the wrong shape.
    #[error("invalid snapshot file {}: {reason}", path.display())]
    InvalidFile { path: PathBuf, reason: String },

    /// The directory that should contain the test file does not exist.
    #[error("the directory containing the test file does not exist: {}", path.display())]
    MissingDirectory { path: PathBuf },

    /// Reading or writing a file failed.
    #[error("snapshot file I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed JSON.
    #[error("could not parse snapshot file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory tree could not be serialized.
    #[error("could not serialize snapshot file: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
