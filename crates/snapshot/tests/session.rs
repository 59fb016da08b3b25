use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use rust_decimal::Decimal;
use serde_json::json;
use snappiershot::{
    CallerInfo, Config, JsonFileStore, Snapshot, SnapshotError, SnapshotStatus, Value,
};
use tempfile::TempDir;
use time::macros::date;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Project {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn test_file(&self) -> PathBuf {
        self.dir.path().join("test_report.rs")
    }

    fn snapshot_file(&self) -> PathBuf {
        self.dir.path().join(".snapshots").join("test_report.json")
    }

    fn session(&self) -> Snapshot {
        Snapshot::new(
            Config::default(),
            CallerInfo::new(self.test_file(), "report::builds_totals"),
            JsonFileStore::default(),
        )
    }

    fn stored(&self) -> serde_json::Value {
        let text = fs::read_to_string(self.snapshot_file()).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

fn totals(amount: f64) -> Value {
    Value::map([
        ("customer", Value::from("ACME")),
        ("amount", Value::from(amount)),
        ("due", Value::from(date!(2024 - 03 - 01))),
        ("tax", Value::from(Decimal::new(1999, 2))),
        ("tags", Value::set(["b", "a"])),
    ])
}

#[test]
fn first_run_records_second_run_passes() {
    let project = Project::new();
    assert!(!project.snapshot_file().exists());

    let mut first = project.session();
    first.scope(|s| s.assert_match(totals(10.5))).unwrap();
    assert_eq!(first.statuses(), [SnapshotStatus::Written]);

    let stored = project.stored();
    assert_eq!(stored["snappiershot_version"], json!(env!("CARGO_PKG_VERSION")));
    let entry = &stored["tests"]["report::builds_totals"][0];
    assert_eq!(entry["metadata"]["update_on_next_run"], json!(false));
    assert_eq!(
        entry["snapshots"][0]["due"],
        json!({"__snappiershot_datetime__": "date", "value": "2024-03-01"})
    );
    assert_eq!(entry["snapshots"][0]["amount"], json!(10.5));

    let modified = fs::metadata(project.snapshot_file()).unwrap().modified().unwrap();
    let mut second = project.session();
    second.scope(|s| s.assert_match(totals(10.5))).unwrap();
    assert_eq!(second.statuses(), [SnapshotStatus::Passed]);
    assert_eq!(
        fs::metadata(project.snapshot_file()).unwrap().modified().unwrap(),
        modified
    );
}

#[test]
fn changed_value_fails_with_path_and_tolerances() {
    let project = Project::new();
    project
        .session()
        .scope(|s| s.assert_match(totals(10.5)))
        .unwrap();

    let err = project
        .session()
        .scope(|s| s.assert_match(totals(11.5)))
        .unwrap_err();
    let message = err.to_string();
    assert!(err.is_mismatch());
    assert!(message.starts_with("Snapshot does not match:\n"), "{}", message);
    assert!(message.contains("Summary:"), "{}", message);
    assert!(message.contains(r#"> ["amount"]: Floats not almost equal"#), "{}", message);
    assert!(message.contains("Relative tolerance: 0.001"), "{}", message);
    assert!(message.contains("Absolute tolerance: 1e-6"), "{}", message);

    // A failure leaves the stored value alone.
    let stored = project.stored();
    assert_eq!(
        stored["tests"]["report::builds_totals"][0]["snapshots"][0]["amount"],
        json!(10.5)
    );
}

#[test]
fn small_float_drift_passes() {
    let project = Project::new();
    project
        .session()
        .scope(|s| s.assert_match(totals(10.5)))
        .unwrap();
    project
        .session()
        .scope(|s| s.assert_match(totals(10.5 + 1e-4)))
        .unwrap();
}

#[test]
fn assertion_outside_scope_is_a_usage_error() {
    let project = Project::new();
    let mut snapshot = project.session();
    let err = snapshot.assert_match(1).unwrap_err();
    assert!(matches!(err, SnapshotError::OutsideContext));
    assert!(!project.snapshot_file().exists());
}

#[test]
fn nothing_asserted_writes_nothing() {
    let project = Project::new();
    project.session().scope(|_| Ok(())).unwrap();
    assert!(!project.snapshot_file().exists());
}

#[test]
fn missing_test_directory_is_reported() {
    let project = Project::new();
    let mut snapshot = Snapshot::new(
        Config::default(),
        CallerInfo::new(project.dir.path().join("gone").join("t.rs"), "t"),
        JsonFileStore::default(),
    );
    let err = snapshot.scope(|s| s.assert_match(1)).unwrap_err();
    assert!(matches!(err, SnapshotError::Storage(_)), "{}", err);
}

#[test]
fn user_edited_update_flag_rerecords() {
    let project = Project::new();
    project
        .session()
        .scope(|s| s.assert_match(totals(10.5)))
        .unwrap();

    let mut stored = project.stored();
    stored["tests"]["report::builds_totals"][0]["metadata"]["update_on_next_run"] = json!(true);
    fs::write(project.snapshot_file(), stored.to_string()).unwrap();

    project
        .session()
        .scope(|s| s.assert_match(totals(99.0)))
        .unwrap();
    let stored = project.stored();
    let entry = &stored["tests"]["report::builds_totals"][0];
    assert_eq!(entry["snapshots"][0]["amount"], json!(99.0));
    assert_eq!(entry["metadata"]["update_on_next_run"], json!(false));
}

#[test]
fn from_caller_reads_manifest_config() {
    let project = Project::new();
    fs::write(
        project.dir.path().join("Cargo.toml"),
        "[package]\nname = \"demo\"\n\n[package.metadata.snappiershot]\njson_indentation = 2\nfull_diff = true\n",
    )
    .unwrap();

    let caller = CallerInfo::new(project.test_file(), "report::builds_totals");
    let mut snapshot = Snapshot::from_caller(caller).unwrap();
    assert!(snapshot.config().full_diff);
    assert_eq!(snapshot.store().indent(), 2);

    snapshot.scope(|s| s.assert_match(vec![1, 2])).unwrap();
    let text = fs::read_to_string(project.snapshot_file()).unwrap();
    assert!(text.contains("\n  \"tests\""), "{}", text);
}

#[test]
fn raises_snapshots_the_error() {
    #[derive(Debug, thiserror::Error)]
    #[error("no such account: {0}")]
    struct MissingAccount(String);

    let project = Project::new();
    let lookup = || -> Result<(), Box<dyn std::error::Error>> {
        Err(MissingAccount("acme".into()).into())
    };
    project
        .session()
        .scope(|s| s.raises::<MissingAccount, ()>(lookup))
        .unwrap();

    let stored = project.stored();
    assert_eq!(
        stored["tests"]["report::builds_totals"][0]["snapshots"][0],
        json!({"exception_type": "MissingAccount", "exception_value": "no such account: acme"})
    );
    project
        .session()
        .scope(|s| s.raises::<MissingAccount, ()>(lookup))
        .unwrap();
}

#[test]
fn panicking_test_still_writes_recorded_values() {
    let project = Project::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut snapshot = project.session();
        let _ = snapshot.scope(|s| -> Result<(), SnapshotError> {
            s.assert_match(totals(10.5))?;
            panic!("assertion after the snapshot failed");
        });
    }));
    assert!(outcome.is_err());

    let stored = project.stored();
    assert_eq!(
        stored["tests"]["report::builds_totals"][0]["snapshots"][0]["amount"],
        json!(10.5)
    );
}

#[test]
fn non_finite_floats_use_bare_tokens() {
    let project = Project::new();
    let values = || Value::from(vec![f64::NAN, f64::INFINITY, f64::NEG_INFINITY]);
    project.session().scope(|s| s.assert_match(values())).unwrap();

    let text = fs::read_to_string(project.snapshot_file()).unwrap();
    assert!(text.contains("NaN,") && text.contains("-Infinity\n"), "{}", text);

    let mut second = project.session();
    second.scope(|s| s.assert_match(values())).unwrap();
    assert_eq!(second.statuses(), [SnapshotStatus::Passed]);
}
