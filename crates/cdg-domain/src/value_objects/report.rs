//! Run report
//!
//! Process-wide state for one invocation, accumulated append-only while
//! workers run and emitted as JSON at run end. The report is the only
//! shared mutable state in the pipeline; workers push outcomes and never
//! overwrite one another's entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{FailureKind, FileState, UnitKind, UnitState};

/// Terminal outcome of one code unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOutcome {
    /// Path of the owning file, relative to the run root where possible
    pub file: String,
    /// Dotted qualified name of the unit
    pub unit: String,
    /// Kind of the unit
    pub kind: UnitKind,
    /// Terminal state the unit reached
    pub state: UnitState,
    /// Human-readable failure reason, present only for failed units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Terminal outcome of one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Path of the file
    pub path: String,
    /// Terminal state the file reached
    pub state: FileState,
    /// Units found in the file
    pub units_total: usize,
    /// Units freshly merged
    pub units_merged: usize,
    /// Units skipped as already documented
    pub units_skipped: usize,
    /// Units that failed
    pub units_failed: usize,
    /// Human-readable skip reason, present only for skipped files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Aggregate report for one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier of this run
    pub run_id: String,
    /// Root directory the run operated on
    pub root: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished; `None` while still running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Per-file outcomes, in completion order
    pub files: Vec<FileOutcome>,
    /// Per-unit outcomes, in completion order
    pub units: Vec<UnitOutcome>,
    /// Number of inference requests actually issued
    pub inference_requests: usize,
    /// Set when the run was aborted before all files were processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal: Option<String>,
}

impl RunReport {
    /// Create a fresh report for a run over `root`
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            root: root.into(),
            started_at: Utc::now(),
            finished_at: None,
            files: Vec::new(),
            units: Vec::new(),
            inference_requests: 0,
            fatal: None,
        }
    }

    /// Append a unit outcome
    pub fn record_unit(&mut self, outcome: UnitOutcome) {
        self.units.push(outcome);
    }

    /// Append a file outcome
    pub fn record_file(&mut self, outcome: FileOutcome) {
        self.files.push(outcome);
    }

    /// Count one issued inference request
    pub fn record_inference_request(&mut self) {
        self.inference_requests += 1;
    }

    /// Mark the run as fatally aborted
    pub fn record_fatal(&mut self, reason: impl Into<String>) {
        // First fatal reason wins; later workers may race to report
        if self.fatal.is_none() {
            self.fatal = Some(reason.into());
        }
    }

    /// Stamp the finish time
    pub fn finalize(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Whether the run was aborted
    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    /// Number of units freshly merged
    pub fn units_merged(&self) -> usize {
        self.units
            .iter()
            .filter(|u| u.state == UnitState::Merged { skipped: false })
            .count()
    }

    /// Number of units skipped as already documented
    pub fn units_skipped(&self) -> usize {
        self.units
            .iter()
            .filter(|u| u.state == UnitState::Merged { skipped: true })
            .count()
    }

    /// Number of failed units
    pub fn units_failed(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.state, UnitState::Failed(_)))
            .count()
    }

    /// Number of files written to disk
    pub fn files_written(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.state == FileState::Written)
            .count()
    }

    /// Number of files skipped for the given reason
    pub fn files_skipped(&self, kind: FailureKind) -> usize {
        self.files
            .iter()
            .filter(|f| f.state == FileState::Skipped(kind))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, state: UnitState) -> UnitOutcome {
        UnitOutcome {
            file: "pkg/mod.py".to_string(),
            unit: name.to_string(),
            kind: UnitKind::Function,
            state,
            reason: None,
        }
    }

    #[test]
    fn test_counters() {
        let mut report = RunReport::new("/tmp/codebase");
        report.record_unit(unit("a", UnitState::Merged { skipped: false }));
        report.record_unit(unit("b", UnitState::Merged { skipped: true }));
        report.record_unit(unit("c", UnitState::Failed(FailureKind::InvalidResponse)));

        assert_eq!(report.units_merged(), 1);
        assert_eq!(report.units_skipped(), 1);
        assert_eq!(report.units_failed(), 1);
        assert!(!report.is_fatal());
    }

    #[test]
    fn test_first_fatal_wins() {
        let mut report = RunReport::new("/tmp/codebase");
        report.record_fatal("endpoint down");
        report.record_fatal("second reason");
        assert_eq!(report.fatal.as_deref(), Some("endpoint down"));
    }
}
