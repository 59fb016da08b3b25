//! Snapshotting the error a block fails with.

use std::error::Error;

use snappiershot_core::value::short_type_name;
use snappiershot_core::{ErrorValue, Value};
use snappiershot_storage::SnapshotStore;

use crate::error::SnapshotError;
use crate::session::{MatchOptions, Snapshot};

const ACCEPTED: &str = "one of the accepted error types";

impl<S: SnapshotStore> Snapshot<S> {
    /// Run `block`, which must fail with an error of type `E`, and assert
    /// that error (its type name and message) against the next snapshot.
    pub fn raises<E, T>(
        &mut self,
        block: impl FnOnce() -> Result<T, Box<dyn Error>>,
    ) -> Result<(), SnapshotError>
    where
        E: Error + 'static,
    {
        self.raises_with::<E, T>(block, MatchOptions::default())
    }

    pub fn raises_with<E, T>(
        &mut self,
        block: impl FnOnce() -> Result<T, Box<dyn Error>>,
        options: MatchOptions,
    ) -> Result<(), SnapshotError>
    where
        E: Error + 'static,
    {
        self.capture(block, short_type_name::<E>(), ErrorValue::downcast::<E>, options)
    }

    /// Like [`raises`](Self::raises) for a block that may fail with any of
    /// several error types. `accept` captures the errors it recognizes:
    ///
    /// ```ignore
    /// s.raises_any(parse, |e| {
    ///     ErrorValue::downcast::<ParseIntError>(e).or_else(|| ErrorValue::downcast::<ParseFloatError>(e))
    /// })?;
    /// ```
    pub fn raises_any<T>(
        &mut self,
        block: impl FnOnce() -> Result<T, Box<dyn Error>>,
        accept: impl Fn(&(dyn Error + 'static)) -> Option<ErrorValue>,
    ) -> Result<(), SnapshotError> {
        self.capture(
            block,
            ACCEPTED.to_string(),
            accept,
            MatchOptions::default(),
        )
    }

    fn capture<T>(
        &mut self,
        block: impl FnOnce() -> Result<T, Box<dyn Error>>,
        expected: String,
        accept: impl Fn(&(dyn Error + 'static)) -> Option<ErrorValue>,
        options: MatchOptions,
    ) -> Result<(), SnapshotError> {
        if !self.is_active() {
            return Err(SnapshotError::OutsideContext);
        }
        let error = match block() {
            Ok(_) => return Err(SnapshotError::NoErrorRaised { expected }),
            Err(error) => error,
        };
        let Some(captured) = accept(&*error) else {
            return Err(SnapshotError::UnexpectedError {
                expected,
                source: error,
            });
        };
        self.assert_match_with(Value::Error(captured), options)
    }
}
