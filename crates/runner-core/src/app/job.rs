//! Job - タスク群の並行実行と集約
//!
//! `run` の流れ:
//! 1. Created -> Running（2 回目の run は `AlreadyRun`）
//! 2. タスクごとに tokio タスクを spawn（per-task timeout を付けた子コンテキスト）
//! 3. 容量 = タスク数の mpsc で TaskReport を 1 件ずつ回収（全 sender が drop されたら終了）
//! 4. 報告をタスク順に並べて Verdict を計算
//! 5. Store::update で最終状態を 1 回だけ保存
//! 6. 失敗なら `JobError::Failed`

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::config::{RunnerConfig, StoreErrorPolicy};
use crate::context::RunContext;
use crate::domain::{
    JobError, JobId, JobState, RunEvent, StoreError, TaskError, TaskReport, Verdict,
};
use crate::ports::{EventSink, Executable, Record, Store};

/// A fixed batch of tasks run concurrently under one context.
///
/// Built by [`JobBuilder`](super::JobBuilder), which registers the job with
/// the store. `success` and `diagnostic` are meaningful once `run` returned.
pub struct Job {
    id: JobId,
    tasks: Vec<Arc<dyn Executable>>,
    store: Arc<dyn Store>,
    events: Arc<dyn EventSink>,
    config: RunnerConfig,
    state: JobState,
    success: bool,
    diagnostic: String,
}

impl Job {
    pub(crate) fn new(
        id: JobId,
        tasks: Vec<Arc<dyn Executable>>,
        store: Arc<dyn Store>,
        events: Arc<dyn EventSink>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            id,
            tasks,
            store,
            events,
            config,
            state: JobState::Created,
            success: false,
            diagnostic: String::new(),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Aggregate outcome. False until `run` has returned.
    pub fn success(&self) -> bool {
        self.success
    }

    /// `task '<name>' failed: <error>` entries joined by `", "`; empty on success.
    pub fn diagnostic(&self) -> &str {
        &self.diagnostic
    }

    pub fn tasks(&self) -> &[Arc<dyn Executable>] {
        &self.tasks
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs every task concurrently and records the aggregate outcome.
    ///
    /// Individual task failures never abort the run; the job fails only after
    /// every task has reported.
    pub async fn run(&mut self, ctx: &RunContext) -> Result<(), JobError> {
        if self.state != JobState::Created {
            return Err(JobError::AlreadyRun(self.id));
        }
        self.state = JobState::Running;
        let started = Instant::now();
        self.events.emit(&RunEvent::JobStarted {
            job_id: self.id,
            task_count: self.tasks.len(),
        });

        self.success = true;
        let reports = self.dispatch(ctx).await;
        debug_assert_eq!(reports.len(), self.tasks.len());

        let verdict = Verdict::from_reports(&reports);
        self.success = verdict.success;
        self.diagnostic = verdict.diagnostic;
        self.state = if self.success {
            JobState::Succeeded
        } else {
            JobState::Failed
        };

        let persisted = self.persist().await;

        let result = match persisted {
            Err(e) => Err(JobError::Store(e)),
            Ok(()) if !self.success => Err(JobError::Failed {
                id: self.id,
                diagnostic: self.diagnostic.clone(),
            }),
            Ok(()) => Ok(()),
        };

        self.events.emit(&RunEvent::JobFinished {
            job_id: self.id,
            success: self.success,
            duration: started.elapsed(),
            error: result.as_ref().err().map(ToString::to_string),
        });
        result
    }

    /// Fan-out / fan-in. Returns exactly one report per task, in task order.
    async fn dispatch(&self, ctx: &RunContext) -> Vec<TaskReport> {
        let count = self.tasks.len();
        if count == 0 {
            return Vec::new();
        }

        // capacity == count: a producer never waits on a full channel
        let (tx, mut rx) = mpsc::channel::<TaskReport>(count);
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(count);
        for (index, task) in self.tasks.iter().enumerate() {
            let task = Arc::clone(task);
            let tx = tx.clone();
            let task_ctx = ctx.with_timeout(self.config.task_timeout());
            handles.push(tokio::spawn(async move {
                let error = task.execute(&task_ctx).await.err();
                let report = TaskReport {
                    index,
                    task_id: task.id(),
                    name: task.name().to_string(),
                    error,
                };
                // the receiver is only dropped after abandonment
                let _ = tx.send(report).await;
            }));
        }
        drop(tx);

        let mut slots: Vec<Option<TaskReport>> = vec![None; count];
        let abandon = abandon_after(ctx, self.config.abandon_grace());
        tokio::pin!(abandon);
        let mut abandoned = false;
        loop {
            tokio::select! {
                report = rx.recv() => match report {
                    Some(report) => {
                        let index = report.index;
                        slots[index] = Some(report);
                    }
                    // every producer has finished
                    None => break,
                },
                _ = &mut abandon => {
                    abandoned = true;
                    break;
                }
            }
        }
        // Producers without a report: abort the ones still running after
        // abandonment, join the rest to learn whether they panicked.
        let mut missing = Vec::new();
        for (index, handle) in handles.into_iter().enumerate() {
            if slots[index].is_some() {
                continue;
            }
            let fate = if abandoned && !handle.is_finished() {
                handle.abort();
                Unreported::Abandoned
            } else {
                match handle.await {
                    Err(e) if e.is_panic() => Unreported::Panicked,
                    _ => Unreported::Lost,
                }
            };
            missing.push((index, fate));
        }
        // reports sent after the receive loop stopped
        while let Ok(report) = rx.try_recv() {
            let index = report.index;
            slots[index] = Some(report);
        }
        for (index, fate) in missing {
            if slots[index].is_none() {
                slots[index] = Some(self.unreported(index, fate));
            }
        }

        slots.into_iter().flatten().collect()
    }

    /// Report standing in for a producer that never delivered one.
    fn unreported(&self, index: usize, fate: Unreported) -> TaskReport {
        let task = &self.tasks[index];
        let error = match fate {
            Unreported::Abandoned => {
                tracing::warn!(
                    job_id = %self.id,
                    task = task.name(),
                    "abandoning task that ignored cancellation"
                );
                TaskError::Timeout
            }
            Unreported::Panicked => {
                tracing::error!(job_id = %self.id, task = task.name(), "task execution panicked");
                TaskError::ExecutionFailed("task panicked".to_string())
            }
            Unreported::Lost => {
                tracing::error!(job_id = %self.id, task = task.name(), "task ended without a report");
                TaskError::ExecutionFailed("task ended without a report".to_string())
            }
        };
        TaskReport {
            index,
            task_id: task.id(),
            name: task.name().to_string(),
            error: Some(error),
        }
    }

    /// Store::update, filtered through the configured policy.
    async fn persist(&self) -> Result<(), StoreError> {
        let id = self.id.to_string();
        match self.store.update(&id, self).await {
            Ok(()) => Ok(()),
            Err(e) => match self.config.store_errors {
                StoreErrorPolicy::Propagate => Err(e),
                StoreErrorPolicy::LogAndContinue => {
                    tracing::warn!(job_id = %self.id, error = %e, "failed to persist job state");
                    Ok(())
                }
            },
        }
    }
}

/// Why a producer left no report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unreported {
    /// Still running when the job gave up on it.
    Abandoned,
    Panicked,
    Lost,
}

/// Resolves once the job should stop waiting for uncooperative tasks.
async fn abandon_after(ctx: &RunContext, grace: Option<Duration>) {
    match grace {
        Some(grace) => {
            ctx.done().await;
            tokio::time::sleep(grace).await;
        }
        None => std::future::pending::<()>().await,
    }
}

impl Record for Job {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn success(&self) -> bool {
        self.success
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("tasks", &self.tasks.len())
            .field("state", &self.state)
            .field("success", &self.success)
            .field("diagnostic", &self.diagnostic)
            .finish()
    }
}
