//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryStore**: プロセス内のストア（RwLock で保護）
//! - **TracedStore**: 任意の Store を包み、操作ごとに構造化ログを出す
//! - **TracingEventSink**: RunEvent を tracing に流す既定のイベント出力
//!
//! リレーショナル DB のストアはこのクレートには含めません。

pub mod memory_store;
pub mod traced_store;
pub mod tracing_sink;

pub use self::memory_store::InMemoryStore;
pub use self::traced_store::TracedStore;
pub use self::tracing_sink::TracingEventSink;
