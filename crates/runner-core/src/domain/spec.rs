//! Input specs: the descriptors a job is built from.
//!
//! A `JobSpec` is what an operator writes down (usually as JSON); the app layer
//! turns each `TaskSpec` into an executable task.

use serde::{Deserialize, Serialize};

/// A batch of tasks to run together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

/// One named command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Human-readable name used in diagnostics.
    pub name: String,

    /// Executable to launch.
    pub cmd: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl TaskSpec {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `cmd` followed by its arguments, space separated.
    pub fn command_line(&self) -> String {
        std::iter::once(self.cmd.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
