//! Ports - 抽象化レイヤー
//!
//! Job が依存する外部との境界を trait として定義します。
//! 実装は `impls`（ストア・イベント出力）と `app`（コマンドタスク）にあります。

pub mod clock;
pub mod event_sink;
pub mod executable;
pub mod id_generator;
pub mod store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::{EventSink, NoopEventSink};
pub use self::executable::Executable;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::store::{Record, Store, StoredRecord};
