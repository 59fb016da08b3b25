use snappiershot_core::{DecodeError, EncodeError};
use snappiershot_storage::StorageError;

/// An invalid `[package.metadata.snappiershot]` table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("the only supported file_format is JSON; found: {0}")]
    UnsupportedFormat(String),

    #[error("the {name} configuration must be non-negative; found: {value}")]
    NegativeTolerance { name: &'static str, value: f64 },

    /// A key holds a value of the wrong type.
    #[error("invalid snappiershot configuration: {0}")]
    Invalid(String),
}

/// Everything a snapshot session can fail with.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// An assertion was made outside `enter`/`exit`.
    #[error("assertions must be made within the snapshot's scope")]
    OutsideContext,

    /// The value differs from the stored snapshot. This is an ordinary test
    /// failure; `report` holds the diff and the divergence summary.
    #[error("Snapshot does not match:\n{report}")]
    Mismatch { index: usize, report: String },

    /// The block passed to `raises` returned `Ok`.
    #[error("no error raised; expected {expected}")]
    NoErrorRaised { expected: String },

    /// The block passed to `raises` failed with an error of another type.
    #[error("expected an error of type {expected}; found: {source}")]
    UnexpectedError {
        expected: String,
        #[source]
        source: Box<dyn std::error::Error>,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("stored snapshot could not be decoded: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SnapshotError {
    /// True for a comparison failure, as opposed to a usage or I/O problem.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, SnapshotError::Mismatch { .. })
    }
}
