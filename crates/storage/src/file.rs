//! The snapshot file model.
//!
//! ```json
//! {
//!     "snappiershot_version": "0.1.0",
//!     "tests": {
//!         "crate::module::test_name": [
//!             {
//!                 "metadata": {
//!                     "user_provided_name": "",
//!                     "test_runner_provided_name": "",
//!                     "update_on_next_run": false,
//!                     "arguments": {}
//!                 },
//!                 "snapshots": [ ... ]
//!             }
//!         ]
//!     }
//! }
//! ```
//!
//! Snapshots and metadata stay in canonical form; decoding happens at use.

use snappiershot_core::{Canonical, Mapping};

pub const VERSION_KEY: &str = "snappiershot_version";
pub const TESTS_KEY: &str = "tests";
pub const METADATA_KEY: &str = "metadata";
pub const SNAPSHOTS_KEY: &str = "snapshots";
pub const UPDATE_ON_NEXT_RUN_KEY: &str = "update_on_next_run";

/// Version written into new snapshot files.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Every snapshot recorded by one test for one metadata combination.
#[derive(Debug, Clone, PartialEq)]
pub struct TestEntry {
    pub metadata: Mapping<Canonical>,
    pub snapshots: Vec<Canonical>,
}

impl TestEntry {
    pub fn new(metadata: Mapping<Canonical>) -> Self {
        TestEntry {
            metadata,
            snapshots: Vec::new(),
        }
    }

    pub fn update_on_next_run(&self) -> bool {
        matches!(
            self.metadata.get(UPDATE_ON_NEXT_RUN_KEY),
            Some(Canonical::Bool(true))
        )
    }

    pub fn set_update_on_next_run(&mut self, update: bool) {
        self.metadata
            .insert(UPDATE_ON_NEXT_RUN_KEY, Canonical::Bool(update));
    }

    fn from_canonical(value: &Canonical) -> Result<Self, String> {
        let map = value
            .as_map()
            .ok_or_else(|| format!("test entry must be a mapping, found {}", value.type_name()))?;
        let metadata = map
            .get(METADATA_KEY)
            .and_then(Canonical::as_map)
            .ok_or_else(|| format!("test entry is missing a '{}' mapping", METADATA_KEY))?;
        let snapshots = map
            .get(SNAPSHOTS_KEY)
            .and_then(Canonical::as_list)
            .ok_or_else(|| format!("test entry is missing a '{}' list", SNAPSHOTS_KEY))?;
        Ok(TestEntry {
            metadata: metadata.clone(),
            snapshots: snapshots.to_vec(),
        })
    }

    fn to_canonical(&self) -> Canonical {
        let mut map = Mapping::with_capacity(2);
        map.insert(METADATA_KEY, Canonical::Map(self.metadata.clone()));
        map.insert(SNAPSHOTS_KEY, Canonical::List(self.snapshots.clone()));
        Canonical::Map(map)
    }
}

/// The parsed contents of a snapshot file.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotFile {
    pub version: String,
    /// Entries per fully qualified test name.
    pub tests: Mapping<Vec<TestEntry>>,
}

impl Default for SnapshotFile {
    fn default() -> Self {
        SnapshotFile::empty()
    }
}

impl SnapshotFile {
    /// The contents used when no file exists yet.
    pub fn empty() -> Self {
        SnapshotFile {
            version: LIBRARY_VERSION.to_string(),
            tests: Mapping::new(),
        }
    }

    /// Read the model out of a parsed tree.
    ///
    /// Errors describe what is wrong; callers attach the file path.
    pub fn from_canonical(tree: &Canonical) -> Result<Self, String> {
        let missing_keys = || format!("expected top-level keys {}, {}", VERSION_KEY, TESTS_KEY);
        let map = tree.as_map().ok_or_else(missing_keys)?;
        let (version, tests) = match (map.get(VERSION_KEY), map.get(TESTS_KEY)) {
            (Some(version), Some(tests)) => (version, tests),
            _ => return Err(missing_keys()),
        };
        let version = version
            .as_str()
            .ok_or_else(|| format!("'{}' must be a string", VERSION_KEY))?;
        let tests = tests
            .as_map()
            .ok_or_else(|| format!("'{}' must be a mapping", TESTS_KEY))?;

        let mut parsed = Mapping::with_capacity(tests.len());
        for (name, entries) in tests.iter() {
            let entries = entries
                .as_list()
                .ok_or_else(|| format!("entries of '{}' must be a list", name))?
                .iter()
                .map(TestEntry::from_canonical)
                .collect::<Result<Vec<_>, _>>()?;
            parsed.insert(name, entries);
        }
        Ok(SnapshotFile {
            version: version.to_string(),
            tests: parsed,
        })
    }

    pub fn to_canonical(&self) -> Canonical {
        let mut tests = Mapping::with_capacity(self.tests.len());
        for (name, entries) in self.tests.iter() {
            tests.insert(
                name,
                Canonical::List(entries.iter().map(TestEntry::to_canonical).collect()),
            );
        }
        let mut map = Mapping::with_capacity(2);
        map.insert(VERSION_KEY, Canonical::Str(self.version.clone()));
        map.insert(TESTS_KEY, Canonical::Map(tests));
        Canonical::Map(map)
    }

    /// Find the entry of `test` whose stored metadata satisfies `matches`,
    /// appending a new entry built from `metadata` when none does.
    ///
    /// Returns the entry index and the stored `update_on_next_run` flag.
    /// The stored flag is reset to `false`.
    pub fn find_or_insert(
        &mut self,
        test: &str,
        metadata: Mapping<Canonical>,
        mut matches: impl FnMut(&Mapping<Canonical>) -> bool,
    ) -> (usize, bool) {
        let entries = self.tests.get_or_insert_with(test, Vec::new);
        if let Some(index) = entries.iter().position(|entry| matches(&entry.metadata)) {
            let entry = &mut entries[index];
            let update = entry.update_on_next_run();
            entry.set_update_on_next_run(false);
            return (index, update);
        }
        let mut entry = TestEntry::new(metadata);
        entry.set_update_on_next_run(false);
        entries.push(entry);
        (entries.len() - 1, false)
    }

    pub fn entry(&self, test: &str, index: usize) -> Option<&TestEntry> {
        self.tests.get(test)?.get(index)
    }

    pub fn entry_mut(&mut self, test: &str, index: usize) -> Option<&mut TestEntry> {
        self.tests.get_mut(test)?.get_mut(index)
    }
}
