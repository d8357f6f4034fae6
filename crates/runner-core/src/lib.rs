//! runner-core
//!
//! Concurrent execution of a fixed batch of commands as one job.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, spec, state, report, events, errors）
//! - **ports**: 抽象化レイヤー（Store, Executable, EventSink, Clock, IdGenerator）
//! - **context**: キャンセルと期限の伝播（RunContext）
//! - **app**: アプリケーションロジック（JobBuilder, Job, CommandTask, RunnerConfig）
//! - **impls**: 実装（InMemoryStore, TracedStore, TracingEventSink）

pub mod app;
pub mod context;
pub mod domain;
pub mod impls;
pub mod ports;

#[cfg(test)]
mod testing;

pub use crate::app::{CommandTask, Job, JobBuilder, RunnerConfig, StoreErrorPolicy};
pub use crate::context::{ContextError, RunContext};
pub use crate::domain::{JobError, JobId, JobSpec, StoreError, TaskError, TaskId, TaskSpec};
