//! Errors produced by the task runtime.
//!
//! Handler failures are never recovered: they end the task's loop and are
//! reported here, tagged with the task name.

use crate::core::HandlerError;
use std::time::Duration;
use thiserror::Error;

/// # Errors produced by running tasks.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// `start` was called on a task that was already started.
    #[error("task '{task}' was already started")]
    AlreadyStarted { task: String },

    /// The OS refused to spawn the task's thread.
    #[error("failed to spawn thread for task '{task}': {source}")]
    Spawn {
        task: String,
        #[source]
        source: std::io::Error,
    },

    /// A handler or lifecycle hook failed; the task's loop ended.
    #[error("task '{task}' failed: {source}")]
    Handler {
        task: String,
        #[source]
        source: HandlerError,
    },

    /// The task's thread panicked.
    #[error("task '{task}' panicked: {message}")]
    Panicked { task: String, message: String },

    /// `join` gave up waiting; the task is still joinable.
    #[error("task '{task}' did not exit within {timeout:?}")]
    JoinTimeout { task: String, timeout: Duration },
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskfsm::TaskError;
    ///
    /// let err = TaskError::AlreadyStarted { task: "mpc".into() };
    /// assert_eq!(err.as_label(), "task_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::AlreadyStarted { .. } => "task_already_started",
            TaskError::Spawn { .. } => "task_spawn_failed",
            TaskError::Handler { .. } => "task_handler_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::JoinTimeout { .. } => "task_join_timeout",
        }
    }

    /// Name of the task the error belongs to.
    pub fn task(&self) -> &str {
        match self {
            TaskError::AlreadyStarted { task }
            | TaskError::Spawn { task, .. }
            | TaskError::Handler { task, .. }
            | TaskError::Panicked { task, .. }
            | TaskError::JoinTimeout { task, .. } => task,
        }
    }

    /// True if the task's loop ended because of its own failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TaskError::Handler { .. } | TaskError::Panicked { .. })
    }
}
