//! CommandTask - 外部コマンドを 1 回実行するタスク
//!
//! - コンテキストが終わったら子プロセスを kill して `Timeout` を返す
//! - 起動できない / 非ゼロ終了は `ExecutionFailed`
//! - stdout は捨て、stderr はこのプロセスの stderr に流す

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

use crate::context::RunContext;
use crate::domain::{RunEvent, TaskError, TaskId, TaskSpec, TaskState};
use crate::impls::TracingEventSink;
use crate::ports::{EventSink, Executable};

#[derive(Debug)]
struct Outcome {
    state: TaskState,
    error: Option<TaskError>,
}

/// A named command with its arguments.
pub struct CommandTask {
    id: TaskId,
    name: String,
    program: String,
    args: Vec<String>,
    outcome: Mutex<Outcome>,
    events: Arc<dyn EventSink>,
}

impl CommandTask {
    pub fn new<I, S>(id: TaskId, name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            name: name.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            outcome: Mutex::new(Outcome {
                state: TaskState::Pending,
                error: None,
            }),
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn from_spec(id: TaskId, spec: &TaskSpec) -> Self {
        Self::new(id, spec.name.clone(), spec.cmd.clone(), spec.args.iter().cloned())
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Error of the most recent execution, if it failed.
    pub fn last_error(&self) -> Option<TaskError> {
        self.outcome().error.clone()
    }

    fn outcome(&self) -> std::sync::MutexGuard<'_, Outcome> {
        self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, result: &Result<(), TaskError>) {
        let mut outcome = self.outcome();
        outcome.state = TaskState::finished(result);
        outcome.error = result.as_ref().err().cloned();
    }

    async fn run_command(&self, ctx: &RunContext) -> Result<(), TaskError> {
        if ctx.is_done() {
            return Err(TaskError::Timeout);
        }

        let spawned = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(_) if ctx.is_done() => return Err(TaskError::Timeout),
            Err(e) => {
                return Err(TaskError::ExecutionFailed(format!(
                    "failed to launch '{}': {e}",
                    self.program
                )));
            }
        };

        tokio::select! {
            status = child.wait() => match status {
                Ok(status) if status.success() => Ok(()),
                // killed or exited while the context was closing
                _ if ctx.is_done() => Err(TaskError::Timeout),
                Ok(status) => Err(TaskError::ExecutionFailed(status.to_string())),
                Err(e) => Err(TaskError::ExecutionFailed(format!("wait failed: {e}"))),
            },
            _ = ctx.done() => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(task = %self.name, error = %e, "failed to kill timed out command");
                }
                Err(TaskError::Timeout)
            }
        }
    }
}

#[async_trait]
impl Executable for CommandTask {
    fn id(&self) -> TaskId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &RunContext) -> Result<(), TaskError> {
        let started = Instant::now();
        let command = self.command_line();
        {
            let mut outcome = self.outcome();
            outcome.state = TaskState::Running;
            outcome.error = None;
        }
        self.events.emit(&RunEvent::TaskStarted {
            task_id: self.id,
            name: self.name.clone(),
            command: command.clone(),
        });

        let result = self.run_command(ctx).await;
        self.record(&result);

        self.events.emit(&RunEvent::TaskFinished {
            task_id: self.id,
            name: self.name.clone(),
            command,
            duration: started.elapsed(),
            error: result.as_ref().err().map(ToString::to_string),
        });
        result
    }

    fn state(&self) -> TaskState {
        self.outcome().state
    }
}

impl std::fmt::Debug for CommandTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("command", &self.command_line())
            .field("state", &self.state())
            .finish()
    }
}
