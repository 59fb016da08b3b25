use std::fmt;

/// Where one snapshot of a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotStatus {
    /// Found in the file but not asserted against yet.
    Unchecked,
    Failed,
    Passed,
    /// Staged to be written on exit.
    Recorded,
    /// Written (or overwritten) on exit.
    Written,
}

impl fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapshotStatus::Unchecked => "unchecked",
            SnapshotStatus::Failed => "failed",
            SnapshotStatus::Passed => "passed",
            SnapshotStatus::Recorded => "recorded",
            SnapshotStatus::Written => "written",
        };
        write!(f, "{}", name)
    }
}
