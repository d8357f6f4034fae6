//! JobBuilder - Job の構築とワイヤリング
//!
//! - ID 生成・イベント出力・設定を差し替え可能
//! - `build()` で JobId を払い出し、Store に登録してから Job を返す
//! - Store の create 失敗は `StoreErrorPolicy` に従う（既定はログのみ）

use std::sync::Arc;

use super::config::{RunnerConfig, StoreErrorPolicy};
use super::job::Job;
use super::task::CommandTask;
use crate::domain::{JobError, JobSpec, TaskSpec};
use crate::impls::TracingEventSink;
use crate::ports::{EventSink, Executable, IdGenerator, Store, SystemClock, UlidGenerator};

/// Assembles a [`Job`] from tasks and the collaborators it runs against.
///
/// ```ignore
/// let mut job = JobBuilder::new(store)
///     .config(RunnerConfig::default())
///     .spec(&spec)
///     .build()
///     .await?;
/// job.run(&RunContext::with_root_timeout(Duration::from_secs(4))).await?;
/// ```
pub struct JobBuilder {
    store: Arc<dyn Store>,
    ids: Arc<dyn IdGenerator>,
    events: Arc<dyn EventSink>,
    config: RunnerConfig,
    tasks: Vec<Arc<dyn Executable>>,
    commands: Vec<TaskSpec>,
}

impl JobBuilder {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            ids: Arc::new(UlidGenerator::new(SystemClock)),
            events: Arc::new(TracingEventSink),
            config: RunnerConfig::default(),
            tasks: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Sink for job events; command tasks added through `command` / `spec` share it.
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds an already constructed task.
    pub fn task(mut self, task: Arc<dyn Executable>) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn tasks<I>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Executable>>,
    {
        self.tasks.extend(tasks);
        self
    }

    /// Adds a command task; its id is assigned in `build`.
    pub fn command(mut self, spec: TaskSpec) -> Self {
        self.commands.push(spec);
        self
    }

    pub fn spec(mut self, spec: &JobSpec) -> Self {
        self.commands.extend(spec.tasks.iter().cloned());
        self
    }

    /// Creates the job and registers it with the store.
    pub async fn build(self) -> Result<Job, JobError> {
        let Self {
            store,
            ids,
            events,
            config,
            mut tasks,
            commands,
        } = self;

        for spec in &commands {
            let task = CommandTask::from_spec(ids.generate_task_id(), spec)
                .with_events(Arc::clone(&events));
            tasks.push(Arc::new(task));
        }

        let job = Job::new(ids.generate_job_id(), tasks, Arc::clone(&store), events, config);

        if let Err(e) = store.create(&job).await {
            match job.config().store_errors {
                StoreErrorPolicy::Propagate => return Err(JobError::Store(e)),
                StoreErrorPolicy::LogAndContinue => {
                    tracing::warn!(job_id = %job.id(), error = %e, "failed to register job");
                }
            }
        }

        tracing::debug!(job_id = %job.id(), tasks = job.tasks().len(), "job built");
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunContext;
    use crate::domain::{JobState, StoreError};
    use crate::ports::{FixedClock, NoopEventSink};
    use crate::testing::{RecordingSink, RecordingStore, ScriptedTask};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    #[tokio::test]
    async fn registers_job_with_store() {
        let store = Arc::new(RecordingStore::new());
        let job = JobBuilder::new(store.clone()).build().await.unwrap();

        assert_eq!(store.creates(), 1);
        let stored = store.get(&job.id().to_string()).await.unwrap();
        assert!(!stored.success);
        assert_eq!(job.state(), JobState::Created);
        assert!(!job.success());
    }

    #[tokio::test]
    async fn commands_get_task_ids_and_shared_sink() {
        let store = Arc::new(RecordingStore::new());
        let sink = Arc::new(RecordingSink::default());
        let spec = JobSpec {
            tasks: vec![
                TaskSpec::new("a", "sh").arg("-c").arg("exit 0"),
                TaskSpec::new("b", "sh").arg("-c").arg("exit 0"),
            ],
        };

        let mut job = JobBuilder::new(store)
            .events(sink.clone())
            .spec(&spec)
            .build()
            .await
            .unwrap();

        let names: Vec<_> = job.tasks().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_ne!(job.tasks()[0].id(), job.tasks()[1].id());

        job.run(&RunContext::background()).await.unwrap();
        // job started/finished + start/finish for each task
        assert_eq!(sink.events().len(), 6);
    }

    #[tokio::test]
    async fn silent_sink_still_runs_commands() {
        let store = Arc::new(RecordingStore::new());
        let mut job = JobBuilder::new(store.clone())
            .events(Arc::new(NoopEventSink))
            .command(TaskSpec::new("quiet", "sh").arg("-c").arg("exit 0"))
            .build()
            .await
            .unwrap();

        job.run(&RunContext::background()).await.unwrap();

        assert!(job.tasks()[0].success());
        assert_eq!(store.updates().len(), 1);
    }

    #[tokio::test]
    async fn explicit_tasks_come_before_commands() {
        let store = Arc::new(RecordingStore::new());
        let job = JobBuilder::new(store)
            .command(TaskSpec::new("cmd", "true"))
            .task(ScriptedTask::ok("scripted", Duration::ZERO).shared())
            .build()
            .await
            .unwrap();

        let names: Vec<_> = job.tasks().iter().map(|t| t.name()).collect();
        assert_eq!(names, ["scripted", "cmd"]);
    }

    #[tokio::test]
    async fn ids_follow_the_injected_clock() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let store = Arc::new(RecordingStore::new());
        let job = JobBuilder::new(store)
            .ids(Arc::new(UlidGenerator::new(FixedClock::new(at))))
            .build()
            .await
            .unwrap();

        assert_eq!(
            job.id().as_ulid().timestamp_ms(),
            at.timestamp_millis() as u64
        );
    }

    #[tokio::test]
    async fn create_error_is_logged_by_default() {
        let store = Arc::new(RecordingStore::failing_create());
        let job = JobBuilder::new(store.clone()).build().await;

        assert!(job.is_ok());
        assert_eq!(store.creates(), 1);
    }

    #[tokio::test]
    async fn create_error_fails_build_when_propagating() {
        let store = Arc::new(RecordingStore::failing_create());
        let err = JobBuilder::new(store)
            .config(RunnerConfig::default().with_store_errors(StoreErrorPolicy::Propagate))
            .build()
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Store(StoreError::Backend(_))));
    }
}
