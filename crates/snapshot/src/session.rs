//! The per-test snapshot session.
//!
//! A [`Snapshot`] is opened for one test. The first assertion locates and
//! reads the snapshot file and finds (or creates) the entry whose metadata
//! matches the caller. Each assertion then takes the next snapshot index: it
//! is compared against the value stored at that index last run, or recorded
//! when nothing is stored there. Recorded values are written once, when the
//! scope is exited.
//!
//! ```ignore
//! use snappiershot::{snapshot, Value};
//!
//! #[test]
//! fn renders_totals() -> Result<(), snappiershot::SnapshotError> {
//!     let mut snapshot = snapshot!()?;
//!     snapshot.scope(|s| {
//!         s.assert_match(Value::map([("total", 12.5)]))?;
//!         s.assert_match(vec![1, 2, 3])
//!     })
//! }
//! ```

use std::path::{Path, PathBuf};

use snappiershot_compare::{render, Comparison};
use snappiershot_core::{decode, encode, Canonical, Value};
use snappiershot_storage::{JsonFileStore, SnapshotFile, SnapshotStore};
use tracing::{debug, warn};

use crate::caller::CallerInfo;
use crate::config::Config;
use crate::error::SnapshotError;
use crate::metadata::SnapshotMetadata;
use crate::status::SnapshotStatus;

/// Per-assertion options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Compare floats exactly instead of within the configured tolerances.
    pub exact: bool,
    /// Overwrite the stored value instead of comparing against it.
    pub update: bool,
}

/// The snapshot file as loaded by the first assertion of a session.
#[derive(Debug)]
struct Loaded {
    location: PathBuf,
    file: SnapshotFile,
    test: String,
    entry: usize,
    update_on_next_run: bool,
    statuses: Vec<SnapshotStatus>,
    changed: bool,
}

impl Loaded {
    fn stored(&self, index: usize) -> Option<&Canonical> {
        self.file
            .entry(&self.test, self.entry)?
            .snapshots
            .get(index)
    }

    fn record(&mut self, index: usize, value: Canonical) {
        if let Some(entry) = self.file.entry_mut(&self.test, self.entry) {
            if index < entry.snapshots.len() {
                entry.snapshots[index] = value;
            } else {
                entry.snapshots.resize(index, Canonical::Null);
                entry.snapshots.push(value);
            }
            self.changed = true;
        }
        self.mark(index, SnapshotStatus::Recorded);
    }

    fn mark(&mut self, index: usize, status: SnapshotStatus) {
        if index >= self.statuses.len() {
            self.statuses.resize(index + 1, SnapshotStatus::Unchecked);
        }
        self.statuses[index] = status;
    }
}

/// A snapshot session for one test.
pub struct Snapshot<S: SnapshotStore = JsonFileStore> {
    config: Config,
    metadata: SnapshotMetadata,
    store: S,
    active: bool,
    index: usize,
    loaded: Option<Loaded>,
}

impl Snapshot<JsonFileStore> {
    /// Open a session backed by JSON files, configured from the nearest
    /// `Cargo.toml` above the caller's source file.
    pub fn from_caller(caller: CallerInfo) -> Result<Self, SnapshotError> {
        let start = caller.file.parent().unwrap_or_else(|| Path::new("."));
        let config = Config::discover(start)?;
        let store = JsonFileStore::for_format(&config.file_format, config.json_indentation)?;
        Ok(Snapshot::new(config, caller, store))
    }
}

impl<S: SnapshotStore> Snapshot<S> {
    pub fn new(config: Config, caller: CallerInfo, store: S) -> Self {
        Snapshot {
            config,
            metadata: SnapshotMetadata::new(caller, false),
            store,
            active: false,
            index: 0,
            loaded: None,
        }
    }

    /// Name given to the snapshots by the test author.
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.user_provided_name = name.into();
        self
    }

    /// Name given to the test by the test runner.
    pub fn with_runner_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.test_runner_provided_name = name.into();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Status of every snapshot index seen so far. Empty until the first
    /// assertion.
    pub fn statuses(&self) -> &[SnapshotStatus] {
        self.loaded
            .as_ref()
            .map_or(&[][..], |loaded| loaded.statuses.as_slice())
    }

    /// True between `enter` and `exit`.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open the scope in which assertions may be made.
    pub fn enter(&mut self) {
        self.active = true;
    }

    /// Close the scope, writing the snapshot file if anything was recorded.
    pub fn exit(&mut self) -> Result<(), SnapshotError> {
        self.active = false;
        let Some(loaded) = self.loaded.as_mut() else {
            return Ok(());
        };
        if !loaded.changed {
            debug!(test = %loaded.test, "nothing recorded, snapshot file left untouched");
            return Ok(());
        }
        self.store.write(&loaded.location, &loaded.file)?;
        loaded.changed = false;
        for status in &mut loaded.statuses {
            if *status == SnapshotStatus::Recorded {
                *status = SnapshotStatus::Written;
            }
        }
        debug!(test = %loaded.test, location = %loaded.location.display(), "snapshot file written");
        Ok(())
    }

    /// Run `body` inside the scope. The scope is exited whether or not
    /// `body` fails; the body's error takes precedence over a write error.
    /// If `body` panics, recorded values are written while the session drops.
    pub fn scope<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, SnapshotError>,
    ) -> Result<T, SnapshotError> {
        self.enter();
        let result = body(self);
        let exited = self.exit();
        let value = result?;
        exited?;
        Ok(value)
    }

    /// Assert that `value` matches the next stored snapshot, recording it
    /// when there is none.
    pub fn assert_match(&mut self, value: impl Into<Value>) -> Result<(), SnapshotError> {
        self.assert_match_with(value, MatchOptions::default())
    }

    pub fn assert_match_with(
        &mut self,
        value: impl Into<Value>,
        options: MatchOptions,
    ) -> Result<(), SnapshotError> {
        if !self.active {
            return Err(SnapshotError::OutsideContext);
        }
        let encoded = encode(&value.into())?;
        if options.update {
            warn!(
                test = %self.metadata.caller_info.function,
                "forcing a snapshot update; do not leave this enabled in CI"
            );
        }

        let tolerances = self.config.tolerances();
        let report_options = self.config.report_options();
        let index = self.index;
        self.index += 1;

        let loaded = self.ensure_loaded()?;
        let stored = if options.update || loaded.update_on_next_run {
            None
        } else {
            loaded.stored(index).cloned()
        };
        let Some(stored) = stored else {
            debug!(test = %loaded.test, index, "recording snapshot");
            loaded.record(index, encoded.value);
            return Ok(());
        };

        debug!(test = %loaded.test, index, "comparing against stored snapshot");
        let actual = decode(&encoded.value)?;
        let expected = decode(&stored)?;
        let comparison = Comparison::new(&actual, &expected, tolerances, options.exact);
        if comparison.is_equal() {
            loaded.mark(index, SnapshotStatus::Passed);
            return Ok(());
        }
        loaded.mark(index, SnapshotStatus::Failed);
        let report = render(
            &encoded.value,
            &stored,
            comparison.divergences(),
            report_options,
        );
        Err(SnapshotError::Mismatch { index, report })
    }

    fn ensure_loaded(&mut self) -> Result<&mut Loaded, SnapshotError> {
        let loaded = match self.loaded.take() {
            Some(loaded) => loaded,
            None => self.load()?,
        };
        Ok(self.loaded.insert(loaded))
    }

    fn load(&mut self) -> Result<Loaded, SnapshotError> {
        let location = self.store.locate(&self.metadata.caller_info.file)?;
        let mut file = self.store.read(&location)?;
        let test = self.metadata.caller_info.function.clone();

        let metadata = &self.metadata;
        let (entry, stored_update) =
            file.find_or_insert(&test, metadata.to_canonical()?, |stored| {
                metadata.matches(stored)
            });
        self.metadata.update_on_next_run |= stored_update;

        let stored_count = file
            .entry(&test, entry)
            .map_or(0, |entry| entry.snapshots.len());
        debug!(
            test = %test,
            location = %location.display(),
            entry,
            stored_count,
            "snapshot file loaded"
        );
        Ok(Loaded {
            location,
            file,
            test,
            entry,
            update_on_next_run: self.metadata.update_on_next_run,
            statuses: vec![SnapshotStatus::Unchecked; stored_count],
            changed: false,
        })
    }
}

impl<S: SnapshotStore> Drop for Snapshot<S> {
    /// A session dropped mid-scope (a panicking assertion in the body)
    /// still writes what it recorded.
    fn drop(&mut self) {
        if self.active {
            if let Err(error) = self.exit() {
                warn!(error = %error, "could not write snapshot file");
            }
        }
    }
}

/// Open a [`Snapshot`] for the enclosing test function, backed by JSON
/// files. Arguments are passed to [`caller_info!`](crate::caller_info).
#[macro_export]
macro_rules! snapshot {
    ($($arg:ident),* $(,)?) => {
        $crate::Snapshot::from_caller($crate::caller_info!($($arg),*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use snappiershot_storage::MemoryStore;

    fn session(store: &MemoryStore) -> Snapshot<&MemoryStore> {
        Snapshot::new(
            Config::default(),
            CallerInfo::new("tests/demo.rs", "demo::case"),
            store,
        )
    }

    fn location() -> PathBuf {
        PathBuf::from("tests/demo.json")
    }

    #[test]
    fn test_panicking_body_still_writes() {
        let store = MemoryStore::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut snapshot = session(&store);
            let _ = snapshot.scope(|s| -> Result<(), SnapshotError> {
                s.assert_match(1)?;
                panic!("check after the snapshot failed");
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(store.write_count(), 1);
        let file = store.get(&location()).unwrap();
        assert_eq!(
            file.entry("demo::case", 0).unwrap().snapshots,
            vec![Canonical::Int(1)]
        );
    }

    #[test]
    fn test_drop_outside_scope_writes_nothing() {
        let store = MemoryStore::new();
        let mut snapshot = session(&store);
        snapshot.enter();
        snapshot.exit().unwrap();
        drop(snapshot);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_outside_scope() {
        let store = MemoryStore::new();
        let mut snapshot = session(&store);
        let err = snapshot.assert_match(1).unwrap_err();
        assert!(matches!(err, SnapshotError::OutsideContext));

        snapshot.scope(|s| s.assert_match(1)).unwrap();
        let err = snapshot.assert_match(1).unwrap_err();
        assert!(matches!(err, SnapshotError::OutsideContext));
    }

    #[test]
    fn test_records_then_passes() {
        let store = MemoryStore::new();
        let mut first = session(&store);
        first
            .scope(|s| {
                s.assert_match(1)?;
                s.assert_match("two")
            })
            .unwrap();
        assert_eq!(first.statuses(), [SnapshotStatus::Written; 2]);
        assert_eq!(store.write_count(), 1);

        let mut second = session(&store);
        second
            .scope(|s| {
                s.assert_match(1)?;
                s.assert_match("two")
            })
            .unwrap();
        assert_eq!(second.statuses(), [SnapshotStatus::Passed; 2]);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_mismatch_reports_path() {
        let store = MemoryStore::new();
        session(&store)
            .scope(|s| s.assert_match(Value::map([("a", 1)])))
            .unwrap();

        let mut snapshot = session(&store);
        let err = snapshot
            .scope(|s| s.assert_match(Value::map([("a", 2)])))
            .unwrap_err();
        match err {
            SnapshotError::Mismatch { index, report } => {
                assert_eq!(index, 0);
                assert!(report.contains(r#"["a"]: 2 != 1"#), "{}", report);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(snapshot.statuses(), [SnapshotStatus::Failed]);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_new_index_is_appended() {
        let store = MemoryStore::new();
        session(&store).scope(|s| s.assert_match(1)).unwrap();

        let mut snapshot = session(&store);
        snapshot
            .scope(|s| {
                s.assert_match(1)?;
                s.assert_match(2)
            })
            .unwrap();
        assert_eq!(
            snapshot.statuses(),
            [SnapshotStatus::Passed, SnapshotStatus::Written]
        );
        let file = store.get(&location()).unwrap();
        assert_eq!(file.entry("demo::case", 0).unwrap().snapshots.len(), 2);
    }

    #[test]
    fn test_forced_update_overwrites() {
        let store = MemoryStore::new();
        session(&store).scope(|s| s.assert_match(1)).unwrap();

        let options = MatchOptions {
            update: true,
            ..MatchOptions::default()
        };
        session(&store)
            .scope(|s| s.assert_match_with(5, options))
            .unwrap();

        let file = store.get(&location()).unwrap();
        assert_eq!(
            file.entry("demo::case", 0).unwrap().snapshots,
            vec![Canonical::Int(5)]
        );
    }

    #[test]
    fn test_stored_update_flag_applies_to_session() {
        let store = MemoryStore::new();
        session(&store)
            .scope(|s| {
                s.assert_match(1)?;
                s.assert_match(2)
            })
            .unwrap();

        let mut file = store.get(&location()).unwrap();
        file.entry_mut("demo::case", 0)
            .unwrap()
            .set_update_on_next_run(true);
        store.insert(location(), file);

        let mut snapshot = session(&store);
        snapshot
            .scope(|s| {
                s.assert_match(10)?;
                s.assert_match(20)
            })
            .unwrap();
        assert_eq!(snapshot.statuses(), [SnapshotStatus::Written; 2]);

        let entry = store.get(&location()).unwrap();
        let entry = entry.entry("demo::case", 0).unwrap();
        assert!(!entry.update_on_next_run());
        assert_eq!(entry.snapshots, vec![Canonical::Int(10), Canonical::Int(20)]);
    }

    #[test]
    fn test_float_tolerance_and_exact() {
        let store = MemoryStore::new();
        session(&store).scope(|s| s.assert_match(1.0)).unwrap();

        session(&store)
            .scope(|s| s.assert_match(1.0 + 1e-7))
            .unwrap();

        let exact = MatchOptions {
            exact: true,
            ..MatchOptions::default()
        };
        let err = session(&store)
            .scope(|s| s.assert_match_with(1.0 + 1e-7, exact))
            .unwrap_err();
        assert!(err.is_mismatch());
    }

    #[test]
    fn test_arguments_select_entry() {
        let store = MemoryStore::new();
        let caller = |n: i64| CallerInfo::new("tests/demo.rs", "demo::case").arg("n", n);
        for n in [1, 2] {
            Snapshot::new(Config::default(), caller(n), &store)
                .scope(|s| s.assert_match(n * 10))
                .unwrap();
        }
        let file = store.get(&location()).unwrap();
        assert_eq!(file.tests.get("demo::case").unwrap().len(), 2);

        Snapshot::new(Config::default(), caller(2), &store)
            .scope(|s| s.assert_match(20))
            .unwrap();
        assert_eq!(store.write_count(), 2);
    }
}
