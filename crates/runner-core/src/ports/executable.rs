//! Executable port - Job が実行する 1 単位の仕事
//!
//! Job はこの trait だけに依存します。具体的な実装は
//! `app::task::CommandTask`（外部コマンド）ですが、テストや組み込み用途では
//! 独自の実装を渡せます。

use async_trait::async_trait;

use crate::context::RunContext;
use crate::domain::{TaskError, TaskId, TaskState};

/// A named unit of work the job can run.
///
/// The job shares each task with its spawned execution through an `Arc`, so
/// `execute` takes `&self` and implementations keep their outcome behind
/// interior mutability.
///
/// Contract:
/// - `execute` must return promptly once `ctx` is done, reporting
///   `TaskError::Timeout`.
/// - `success` is false until an execution has completed without error.
#[async_trait]
pub trait Executable: Send + Sync {
    fn id(&self) -> TaskId;

    fn name(&self) -> &str;

    async fn execute(&self, ctx: &RunContext) -> Result<(), TaskError>;

    fn state(&self) -> TaskState;

    fn success(&self) -> bool {
        self.state() == TaskState::Succeeded
    }
}
