//! EventSink port - 実行イベントの記録
//!
//! Job と各 Task は生成時に `Arc<dyn EventSink>` を受け取ります。
//! グローバルなロガーは持ちません。
//!
//! # 実装
//! - NoopEventSink: 何もしない
//! - TracingEventSink (`impls`): tracing のイベントとして出力

use crate::domain::RunEvent;

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &RunEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &RunEvent) {}
}
