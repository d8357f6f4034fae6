//! App - アプリケーション層
//!
//! ports を組み合わせてジョブ実行を実装します。
//!
//! # 主要コンポーネント
//! - **JobBuilder**: Job の構築と Store への登録
//! - **Job**: タスク群の並行実行（fan-out / fan-in）と結果の集約
//! - **CommandTask**: 外部コマンドを 1 回実行する Executable
//! - **RunnerConfig**: タスクごとのタイムアウトと Store エラーの扱い

pub mod builder;
pub mod config;
pub mod job;
pub mod task;

// 主要な型を再エクスポート
pub use self::builder::JobBuilder;
pub use self::config::{DEFAULT_TASK_TIMEOUT, RunnerConfig, StoreErrorPolicy};
pub use self::job::Job;
pub use self::task::CommandTask;
