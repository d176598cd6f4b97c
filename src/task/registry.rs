//! # Registry of running tasks.
//!
//! The registry is the only structure shared between tasks. A task is a
//! member from the moment its loop is entered until it exits (cleanly, with
//! an error, or by panicking), so broadcasts only reach running tasks.
//!
//! ## Rules
//! - Membership changes and broadcast delivery are serialized by one lock
//! - Broadcast posts while holding the read lock, so once `deregister`
//!   returns no broadcast can reach the removed task
//! - The emitter never receives its own broadcast

use super::handle::{TaskHandle, TaskId};
use crate::core::{Event, EventKind};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Set of currently running tasks, keyed by id.
pub struct Registry<K> {
    tasks: RwLock<HashMap<TaskId, TaskHandle<K>>>,
}

impl<K: EventKind> Registry<K> {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: RwLock::new(HashMap::new()),
        })
    }

    pub(crate) fn register(&self, handle: TaskHandle<K>) {
        debug!(task = handle.name(), id = %handle.id(), "task registered");
        self.tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.id(), handle);
    }

    pub(crate) fn deregister(&self, id: TaskId) -> bool {
        let removed = self
            .tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if let Some(handle) = &removed {
            debug!(task = handle.name(), id = %id, "task deregistered");
        }
        removed.is_some()
    }

    /// Post `event` to every registered task except `from`.
    ///
    /// Returns the number of receivers. Delivery order across receivers is
    /// unspecified; each receiver gets the event exactly once.
    pub fn broadcast(&self, from: TaskId, event: &Event<K>) -> usize {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        let mut receivers = 0;
        for handle in tasks.values().filter(|handle| handle.id() != from) {
            handle.post(event.clone());
            receivers += 1;
        }
        receivers
    }

    /// Returns true if the task with `id` is currently running.
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    /// Number of running tasks.
    pub fn len(&self) -> usize {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns sorted list of running task names.
    pub fn names(&self) -> Vec<String> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = tasks.values().map(|h| h.name().to_string()).collect();
        names.sort_unstable();
        names
    }
}
