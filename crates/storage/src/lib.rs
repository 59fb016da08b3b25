mod error;
mod file;
mod json_store;
mod memory;
mod traits;

pub use error::StorageError;
pub use file::{
    SnapshotFile, TestEntry, LIBRARY_VERSION, METADATA_KEY, SNAPSHOTS_KEY, TESTS_KEY,
    UPDATE_ON_NEXT_RUN_KEY, VERSION_KEY,
};
pub use json_store::{JsonFileStore, JSON_FORMAT, SNAPSHOT_DIRECTORY};
pub use memory::MemoryStore;
pub use traits::SnapshotStore;
