//! Per-task event queue with a wake primitive.
//!
//! The queue is FIFO and unbounded. Posting wakes the owning task through a
//! condition variable and, when configured, through an adapter [`Notify`]
//! hook for tasks that block somewhere else (a socket, a native event pump).

use crate::core::Event;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Wake-up hook called after every post and on stop.
///
/// Runs on whichever thread posts or stops: another task, an adapter thread,
/// or the task's own thread when a handler posts to itself or stops itself.
/// A broadcast calls it while the registry is read-locked. It must only
/// signal (write to a non-blocking pipe, post a native message, send on an
/// unbounded channel); blocking here can stall the task that would drain it.
/// It is not called when the task exits.
pub trait Notify: Send + Sync {
    fn notify(&self);
}

impl<F> Notify for F
where
    F: Fn() + Send + Sync,
{
    fn notify(&self) {
        self()
    }
}

pub(crate) struct Mailbox<K> {
    queue: Mutex<VecDeque<Event<K>>>,
    ready: Condvar,
    running: AtomicBool,
    notify: Option<Arc<dyn Notify>>,
}

impl<K> Mailbox<K> {
    pub(crate) fn new(notify: Option<Arc<dyn Notify>>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
            running: AtomicBool::new(false),
            notify,
        }
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Event<K>>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event and wake the task.
    pub(crate) fn push(&self, event: Event<K>) {
        self.queue().push_back(event);
        self.wake();
    }

    pub(crate) fn pop(&self) -> Option<Event<K>> {
        self.queue().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue().len()
    }

    pub(crate) fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// Clear the running flag and wake any blocked wait.
    pub(crate) fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake();
    }

    /// Clear the running flag without waking anyone. Used on exit, when the
    /// only waiter is the exiting thread itself.
    pub(crate) fn finish(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Drop every queued event, returning how many there were.
    pub(crate) fn clear(&self) -> usize {
        let mut queue = self.queue();
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Block until an event is queued, the task is stopped, or `timeout`
    /// elapses. Returns true if events are pending.
    pub(crate) fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut queue = self.queue();
        while queue.is_empty() && self.is_running() {
            match deadline {
                None => {
                    queue = self
                        .ready
                        .wait(queue)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    queue = self
                        .ready
                        .wait_timeout(queue, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
        !queue.is_empty()
    }

    fn wake(&self) {
        // Taking the lock orders this wake after any waiter's emptiness check.
        drop(self.queue());
        self.ready.notify_all();
        if let Some(notify) = &self.notify {
            notify.notify();
        }
    }
}
