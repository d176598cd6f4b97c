//! Cloneable references to tasks.

use super::mailbox::Mailbox;
use crate::core::{Event, EventKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identity of a task, stable for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle used to post to a task from any thread.
///
/// Posting never fails: events sent to a stopped task are queued and never
/// processed.
pub struct TaskHandle<K> {
    id: TaskId,
    name: Arc<str>,
    mailbox: Arc<Mailbox<K>>,
}

impl<K: EventKind> TaskHandle<K> {
    pub(crate) fn new(name: &str, mailbox: Mailbox<K>) -> Self {
        Self {
            id: TaskId::new(),
            name: Arc::from(name),
            mailbox: Arc::new(mailbox),
        }
    }

    /// Returns the task's unique id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue an event for the task and wake it.
    pub fn post(&self, event: Event<K>) {
        self.mailbox.push(event);
    }

    /// Ask the task to leave its loop at the top of the next iteration.
    pub fn stop(&self) {
        self.mailbox.stop();
    }

    /// True while the task is started and not stopped.
    pub fn is_running(&self) -> bool {
        self.mailbox.is_running()
    }

    /// Number of queued, unprocessed events.
    pub fn pending(&self) -> usize {
        self.mailbox.len()
    }

    pub(crate) fn mailbox(&self) -> &Mailbox<K> {
        &self.mailbox
    }
}

impl<K> Clone for TaskHandle<K> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}

impl<K> fmt::Debug for TaskHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
