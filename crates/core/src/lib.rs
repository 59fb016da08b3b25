//! snappiershot-core: value model and codec for snappiershot snapshots.
//!
//! Runtime values ([`Value`]) are lowered by [`encode()`] into a JSON-shaped
//! [`Canonical`] tree and restored by [`decode()`]. Types JSON cannot carry
//! natively travel as tagged wrappers, described in [`tags`].
//!
//! # Public API
//!
//! - [`encode()`] -- value to canonical tree, with skip diagnostics
//! - [`decode()`] -- canonical tree to value
//! - [`json`] -- canonical tree to and from JSON text
//! - [`Value`], [`Canonical`], [`Mapping`] -- the data model

pub mod canonical;
pub mod decode;
pub mod encode;
pub mod error;
pub mod formats;
pub mod json;
pub mod mapping;
pub mod tags;
pub mod value;

// ── Convenience re-exports: key types ────────────────────────────────

pub use canonical::Canonical;
pub use error::{DecodeError, EncodeError};
pub use mapping::Mapping;
pub use value::{
    Complex, CustomEncodable, DataFrame, ErrorValue, NdArray, Object, ObjectKind, ObjectRef,
    Placeholder, Series, SkipEncodable, SnapPath, Table, Value, ValueSet,
};

// ── Convenience re-exports: codec entry points ───────────────────────

pub use decode::decode;
pub use encode::{encode, Diagnostic, Encoded};
