//! Events - 実行中に発生するイベント
//!
//! Task の実行と Job の実行それぞれについて、開始時に 1 件・終了時に 1 件
//! 発行されます。観測用であり、正しさには関与しません。

use std::time::Duration;

use serde::Serialize;

use super::ids::{JobId, TaskId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    TaskStarted {
        task_id: TaskId,
        name: String,
        command: String,
    },
    TaskFinished {
        task_id: TaskId,
        name: String,
        command: String,
        duration: Duration,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    JobStarted {
        job_id: JobId,
        task_count: usize,
    },
    JobFinished {
        job_id: JobId,
        success: bool,
        duration: Duration,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl RunEvent {
    /// Emitting component ("task" or "job").
    pub fn component(&self) -> &'static str {
        match self {
            RunEvent::TaskStarted { .. } | RunEvent::TaskFinished { .. } => "task",
            RunEvent::JobStarted { .. } | RunEvent::JobFinished { .. } => "job",
        }
    }

    /// "started" or "finished".
    pub fn status(&self) -> &'static str {
        match self {
            RunEvent::TaskStarted { .. } | RunEvent::JobStarted { .. } => "started",
            RunEvent::TaskFinished { .. } | RunEvent::JobFinished { .. } => "finished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn finished_event_is_tagged_and_omits_missing_error() {
        let event = RunEvent::JobFinished {
            job_id: JobId::from_ulid(Ulid::new()),
            success: true,
            duration: Duration::from_millis(5),
            error: None,
        };
        let v = serde_json::to_value(&event).unwrap();
        assert_eq!(v["event"], "job_finished");
        assert_eq!(v["success"], true);
        assert!(v.get("error").is_none());
        assert_eq!(event.component(), "job");
        assert_eq!(event.status(), "finished");
    }

    #[test]
    fn task_events_belong_to_task_component() {
        let event = RunEvent::TaskStarted {
            task_id: TaskId::from_ulid(Ulid::new()),
            name: "low-res".into(),
            command: "sleep 1".into(),
        };
        assert_eq!(event.component(), "task");
        assert_eq!(event.status(), "started");
    }
}
