//! State - タスクとジョブの状態

use serde::{Deserialize, Serialize};

use super::errors::TaskError;

/// State of one task execution.
///
/// State transitions:
/// - Pending -> Running -> Succeeded
/// - Pending -> Running -> TimedOut
/// - Pending -> Running -> Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    TimedOut,
    Failed,
}

impl TaskState {
    /// Terminal state reached by an execution that returned `result`.
    pub fn finished(result: &Result<(), TaskError>) -> Self {
        match result {
            Ok(()) => TaskState::Succeeded,
            Err(TaskError::Timeout) => TaskState::TimedOut,
            Err(TaskError::ExecutionFailed(_)) => TaskState::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::TimedOut | TaskState::Failed
        )
    }
}

/// State of a job.
///
/// Created -> Running -> Succeeded | Failed. There is no way back to Running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Registered with the store, not run yet.
    Created,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}
