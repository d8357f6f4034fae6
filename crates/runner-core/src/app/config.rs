//! RunnerConfig - ジョブ実行の設定
//!
//! JSON では時間をミリ秒で表します。
//! 省略したフィールドは既定値になります。

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-task timeout used when nothing is configured.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(5);

/// What to do when the store rejects `create` / `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorPolicy {
    /// Log a warning and carry on; the job outcome is unaffected.
    #[default]
    #[serde(alias = "log")]
    LogAndContinue,

    /// Surface the error: `JobBuilder::build` fails on create, `Job::run`
    /// returns it on update.
    Propagate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Extra bound attached to every task, nested inside the job context.
    pub task_timeout_ms: u64,

    /// How long the job keeps waiting for tasks that ignore cancellation once
    /// its own context is done. `None`: wait for every task, however long.
    pub abandon_grace_ms: Option<u64>,

    pub store_errors: StoreErrorPolicy,
}

impl RunnerConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_millis(self.task_timeout_ms)
    }

    pub fn abandon_grace(&self) -> Option<Duration> {
        self.abandon_grace_ms.map(Duration::from_millis)
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout_ms = saturating_millis(timeout);
        self
    }

    pub fn with_abandon_grace(mut self, grace: Duration) -> Self {
        self.abandon_grace_ms = Some(saturating_millis(grace));
        self
    }

    pub fn with_store_errors(mut self, policy: StoreErrorPolicy) -> Self {
        self.store_errors = policy;
        self
    }
}

fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            task_timeout_ms: DEFAULT_TASK_TIMEOUT.as_millis() as u64,
            abandon_grace_ms: None,
            store_errors: StoreErrorPolicy::LogAndContinue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_matches_five_second_task_timeout() {
        let c = RunnerConfig::default();
        assert_eq!(c.task_timeout(), Duration::from_secs(5));
        assert_eq!(c.abandon_grace(), None);
        assert_eq!(c.store_errors, StoreErrorPolicy::LogAndContinue);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let c: RunnerConfig = serde_json::from_str(r#"{ "task_timeout_ms": 250 }"#).unwrap();
        assert_eq!(c.task_timeout(), Duration::from_millis(250));
        assert_eq!(c.store_errors, StoreErrorPolicy::LogAndContinue);
    }

    #[rstest]
    #[case::long_name("\"log_and_continue\"", StoreErrorPolicy::LogAndContinue)]
    #[case::short_name("\"log\"", StoreErrorPolicy::LogAndContinue)]
    #[case::propagate("\"propagate\"", StoreErrorPolicy::Propagate)]
    fn store_policy_names(#[case] json: &str, #[case] expected: StoreErrorPolicy) {
        let p: StoreErrorPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(p, expected);
    }

    #[test]
    fn builders_override_fields() {
        let c = RunnerConfig::default()
            .with_task_timeout(Duration::from_millis(1500))
            .with_abandon_grace(Duration::from_millis(20))
            .with_store_errors(StoreErrorPolicy::Propagate);
        assert_eq!(c.task_timeout_ms, 1500);
        assert_eq!(c.abandon_grace(), Some(Duration::from_millis(20)));
        assert_eq!(c.store_errors, StoreErrorPolicy::Propagate);
    }

    #[test]
    fn oversized_durations_saturate() {
        let c = RunnerConfig::default()
            .with_task_timeout(Duration::MAX)
            .with_abandon_grace(Duration::MAX);
        assert_eq!(c.task_timeout_ms, u64::MAX);
        assert_eq!(c.abandon_grace_ms, Some(u64::MAX));
    }
}
