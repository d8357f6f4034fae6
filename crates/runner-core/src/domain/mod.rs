//! Domain model (ids, specs, states, reports, events, errors).
//!
//! このモジュールは実行方式（tokio, プロセス, ストア）に依存しません。

pub mod errors;
pub mod events;
pub mod ids;
pub mod report;
pub mod spec;
pub mod state;

pub use self::errors::{JobError, StoreError, TaskError};
pub use self::events::RunEvent;
pub use self::ids::{JobId, TaskId};
pub use self::report::{TaskReport, Verdict};
pub use self::spec::{JobSpec, TaskSpec};
pub use self::state::{JobState, TaskState};
