//! TracingEventSink - RunEvent を tracing のイベントとして出力

use crate::domain::RunEvent;
use crate::ports::EventSink;

/// Forwards run events to `tracing`.
///
/// Started events and successful finishes are `info`, failed finishes `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &RunEvent) {
        let component = event.component();
        let status = event.status();
        match event {
            RunEvent::TaskStarted {
                task_id,
                name,
                command,
            } => tracing::info!(
                component,
                %task_id,
                name = %name,
                operation = "execute",
                status,
                cmd = %command
            ),
            RunEvent::TaskFinished {
                task_id,
                name,
                command,
                duration,
                error: None,
            } => tracing::info!(
                component,
                %task_id,
                name = %name,
                operation = "execute",
                status,
                cmd = %command,
                ?duration
            ),
            RunEvent::TaskFinished {
                task_id,
                name,
                command,
                duration,
                error: Some(error),
            } => tracing::warn!(
                component,
                %task_id,
                name = %name,
                operation = "execute",
                status,
                cmd = %command,
                %error,
                ?duration
            ),
            RunEvent::JobStarted { job_id, task_count } => {
                tracing::info!(component, %job_id, status, task_count)
            }
            RunEvent::JobFinished {
                job_id,
                success,
                duration,
                error: None,
            } => tracing::info!(component, %job_id, status, success, ?duration),
            RunEvent::JobFinished {
                job_id,
                success,
                duration,
                error: Some(error),
            } => tracing::warn!(component, %job_id, status, success, %error, ?duration),
        }
    }
}
