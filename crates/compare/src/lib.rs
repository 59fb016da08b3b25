//! snappiershot-compare: structural comparison of snapshot values.
//!
//! [`Comparison`] walks an actual and an expected [`snappiershot_core::Value`]
//! in lockstep and records a [`Divergence`] at every point where they differ,
//! keyed by the [`OpPath`] leading there. [`report::render`] turns the result
//! into the text shown on a failed assertion.

pub mod compare;
pub mod divergence;
pub mod path;
pub mod report;

pub use compare::{Comparison, Tolerances};
pub use divergence::{Divergence, DivergenceSet};
pub use path::{Accessor, OpPath};
pub use report::{render, ReportOptions};
