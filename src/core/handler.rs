//! Handler callbacks and the failures they report.

use super::event::Event;
use std::error::Error;
use thiserror::Error;

/// Failure raised by handler logic.
///
/// The runtime never interprets these; a handler error ends the owning
/// task's loop and is surfaced from `start`/`join`.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Source(#[from] Box<dyn Error + Send + Sync>),
}

impl HandlerError {
    /// Build a failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wrap any error type.
    pub fn source<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Source(Box::new(error))
    }
}

/// Result returned by every handler and hook.
pub type HandlerResult = Result<(), HandlerError>;

/// Boxed event callback.
///
/// `C` is the context the callback mutates: adapter data for a bare
/// machine, or a task [`Scope`](crate::task::Scope) when run inside a task.
pub type Handler<K, C> = Box<dyn FnMut(&mut C, &Event<K>) -> HandlerResult + Send>;
