//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ulid::Ulid;

use crate::context::RunContext;
use crate::domain::{RunEvent, StoreError, TaskError, TaskId, TaskState};
use crate::impls::InMemoryStore;
use crate::ports::{EventSink, Executable, Record, Store, StoredRecord};

/// Collects every emitted event.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &RunEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Sleeps for `delay`, then returns a fixed outcome.
///
/// Honours the context unless built with `ignoring_cancel`.
pub struct ScriptedTask {
    id: TaskId,
    name: String,
    delay: Duration,
    outcome: Result<(), TaskError>,
    cooperative: bool,
    state: Mutex<TaskState>,
    executions: AtomicUsize,
}

impl ScriptedTask {
    pub fn ok(name: &str, delay: Duration) -> Self {
        Self::new(name, delay, Ok(()))
    }

    pub fn failing(name: &str, delay: Duration, message: &str) -> Self {
        Self::new(
            name,
            delay,
            Err(TaskError::ExecutionFailed(message.to_string())),
        )
    }

    pub fn new(name: &str, delay: Duration, outcome: Result<(), TaskError>) -> Self {
        Self {
            id: TaskId::from_ulid(Ulid::new()),
            name: name.to_string(),
            delay,
            outcome,
            cooperative: true,
            state: Mutex::new(TaskState::Pending),
            executions: AtomicUsize::new(0),
        }
    }

    pub fn ignoring_cancel(mut self) -> Self {
        self.cooperative = false;
        self
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl Executable for ScriptedTask {
    fn id(&self) -> TaskId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &RunContext) -> Result<(), TaskError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = TaskState::Running;

        let result = if self.cooperative {
            if ctx.is_done() {
                Err(TaskError::Timeout)
            } else {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => self.outcome.clone(),
                    _ = ctx.done() => Err(TaskError::Timeout),
                }
            }
        } else {
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        };

        *self.state.lock().unwrap() = TaskState::finished(&result);
        result
    }

    fn state(&self) -> TaskState {
        *self.state.lock().unwrap()
    }
}

/// Panics instead of reporting.
pub struct PanickingTask {
    pub id: TaskId,
}

impl PanickingTask {
    pub fn new() -> Self {
        Self {
            id: TaskId::from_ulid(Ulid::new()),
        }
    }
}

#[async_trait]
impl Executable for PanickingTask {
    fn id(&self) -> TaskId {
        self.id
    }

    fn name(&self) -> &str {
        "boom"
    }

    async fn execute(&self, _ctx: &RunContext) -> Result<(), TaskError> {
        panic!("boom")
    }

    fn state(&self) -> TaskState {
        TaskState::Running
    }
}

/// What `RecordingStore` saw on an `update` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub id: String,
    pub success: bool,
    /// Whether every watched task had reached a terminal state.
    pub all_tasks_terminal: bool,
}

/// In-memory store that records updates and can be told to fail.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    watched: Mutex<Vec<Arc<dyn Executable>>>,
    updates: Mutex<Vec<UpdateCall>>,
    creates: AtomicUsize,
    fail_create: bool,
    fail_update: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn failing_update() -> Self {
        Self {
            fail_update: true,
            ..Self::default()
        }
    }

    pub fn watch(&self, tasks: &[Arc<dyn Executable>]) {
        self.watched.lock().unwrap().extend(tasks.iter().cloned());
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.updates.lock().unwrap().clone()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn create(&self, record: &dyn Record) -> Result<(), StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(StoreError::Backend("create rejected".into()));
        }
        self.inner.create(record).await
    }

    async fn update(&self, id: &str, record: &dyn Record) -> Result<(), StoreError> {
        let all_tasks_terminal = self
            .watched
            .lock()
            .unwrap()
            .iter()
            .all(|t| t.state().is_terminal());
        self.updates.lock().unwrap().push(UpdateCall {
            id: id.to_string(),
            success: record.success(),
            all_tasks_terminal,
        });
        if self.fail_update {
            return Err(StoreError::Backend("update rejected".into()));
        }
        self.inner.update(id, record).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }

    async fn get(&self, id: &str) -> Result<StoredRecord, StoreError> {
        self.inner.get(id).await
    }

    async fn get_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        self.inner.get_all().await
    }
}
