//! Per-task reports and the aggregate verdict derived from them.
//!
//! A `TaskReport` is produced exactly once per dispatched task and consumed
//! exactly once by `Verdict::from_reports`. Reports are never persisted.

use super::errors::TaskError;
use super::ids::TaskId;

/// Separator between failure entries in the diagnostic text.
pub const DIAGNOSTIC_SEPARATOR: &str = ", ";

/// Outcome of one task execution, as delivered to the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    /// Position of the task in the job's task list.
    pub index: usize,
    pub task_id: TaskId,
    pub name: String,
    pub error: Option<TaskError>,
}

/// Aggregate outcome of a job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub success: bool,
    /// Empty iff `success`.
    pub diagnostic: String,
}

impl Verdict {
    /// Folds reports in the order given.
    ///
    /// Starts optimistic; every report carrying an error flips success and
    /// contributes `task '<name>' failed: <error>`.
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a TaskReport>) -> Self {
        let mut success = true;
        let mut entries = Vec::new();
        for report in reports {
            if let Some(err) = &report.error {
                success = false;
                entries.push(format!("task '{}' failed: {}", report.name, err));
            }
        }
        Self {
            success,
            diagnostic: entries.join(DIAGNOSTIC_SEPARATOR),
        }
    }
}
