//! snappiershot: snapshot testing for Rust.
//!
//! The first run of a test records the values it asserts into a JSON file
//! next to the test source (`.snapshots/<file>.json`). Later runs compare
//! against the recorded values and fail with a structural diff when they
//! differ. Floats compare within configurable tolerances.
//!
//! ```ignore
//! use snappiershot::{snapshot, Value};
//!
//! #[test]
//! fn parses_header() -> Result<(), snappiershot::SnapshotError> {
//!     let header = parse_header("v=2; mode=fast");
//!     snapshot!()?.scope(|s| {
//!         s.assert_match(Value::map([("version", header.version)]))?;
//!         s.assert_match(header.mode)
//!     })
//! }
//! ```
//!
//! # Public API
//!
//! - [`Snapshot`] -- the per-test session: `scope`, `assert_match`, `raises`
//! - [`snapshot!`] / [`caller_info!`] -- open a session for the enclosing test
//! - [`Config`] -- `[package.metadata.snappiershot]` settings
//! - [`SnapshotError`] -- everything an assertion can fail with

pub mod caller;
pub mod config;
pub mod error;
pub mod metadata;
mod raises;
pub mod session;
pub mod status;

// ── Convenience re-exports: session ──────────────────────────────────

pub use caller::CallerInfo;
pub use config::Config;
pub use error::{ConfigError, SnapshotError};
pub use metadata::SnapshotMetadata;
pub use session::{MatchOptions, Snapshot};
pub use status::SnapshotStatus;

// ── Convenience re-exports: values and stores ────────────────────────

pub use snappiershot_compare::Tolerances;
pub use snappiershot_core::{
    Complex, DataFrame, ErrorValue, Mapping, NdArray, Object, ObjectKind, Series, SnapPath,
    Table, Value, ValueSet,
};
pub use snappiershot_storage::{JsonFileStore, MemoryStore, SnapshotStore};
