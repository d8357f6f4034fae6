//! Errors - タスク・ジョブ・ストアのエラー型
//!
//! - `TaskError`: 1 タスクの実行結果（値として TaskReport に載る）
//! - `JobError`: `Job::run` の呼び出し元に返る唯一のエラー
//! - `StoreError`: 永続化サービスのエラー

use thiserror::Error;

use super::ids::JobId;

/// Failure of a single task execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The command exited non-zero or could not be launched.
    #[error("{0}")]
    ExecutionFailed(String),

    /// The bounding context was done before the command exited.
    #[error("execution timed out")]
    Timeout,
}

impl TaskError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum JobError {
    /// One or more tasks failed or timed out.
    #[error("job {id} failed: {diagnostic}")]
    Failed { id: JobId, diagnostic: String },

    #[error("job {0} has already been run")]
    AlreadyRun(JobId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn timeout_has_dedicated_message() {
        assert_eq!(TaskError::Timeout.to_string(), "execution timed out");
        assert!(TaskError::Timeout.is_timeout());
        assert!(!TaskError::ExecutionFailed("exit status: 1".into()).is_timeout());
    }

    #[test]
    fn job_failure_embeds_id_and_diagnostic() {
        let id = JobId::from_ulid(Ulid::new());
        let err = JobError::Failed {
            id,
            diagnostic: "task 'mid-res' failed: exit status: 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with(&format!("job {id} failed: ")));
        assert!(msg.contains("mid-res"));
    }

    #[test]
    fn store_error_converts_into_job_error() {
        let err: JobError = StoreError::NotFound("job-x".into()).into();
        assert!(matches!(err, JobError::Store(StoreError::NotFound(ref id)) if id == "job-x"));
    }
}
