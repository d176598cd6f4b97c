//! Runtime configuration.
//!
//! Plain data structs with sensible defaults. They are passed through the
//! builders; nothing is read from the environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for a single task.
///
/// ## Field semantics
/// - `threaded`: run on a dedicated OS thread (`false` runs on the caller of `start`)
/// - `idle_timeout`: upper bound on one blocking wait of the default routine
///   (`None` = wait until an event is posted or the task is stopped)
/// - `thread_stack_size`: stack size for the spawned thread (`None` = platform default)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub threaded: bool,
    pub idle_timeout: Option<Duration>,
    pub thread_stack_size: Option<usize>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            threaded: true,
            idle_timeout: None,
            thread_stack_size: None,
        }
    }
}

impl TaskConfig {
    /// Configuration for a task that runs on the calling thread.
    pub fn inline() -> Self {
        Self {
            threaded: false,
            ..Self::default()
        }
    }
}

/// Settings for a state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Number of transitions kept for introspection (`0` disables history).
    pub history_limit: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self { history_limit: 32 }
    }
}
