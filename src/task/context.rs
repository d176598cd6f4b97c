//! Task-side view of the runtime.
//!
//! [`Context`] is what a behavior uses to talk to its own task and to the
//! other running tasks. [`Scope`] bundles a context with adapter data and is
//! the context type handlers receive.

use super::behavior::Behavior;
use super::handle::{TaskHandle, TaskId};
use super::registry::Registry;
use crate::core::{Event, EventKind, HandlerError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Operations available to a running task.
///
/// Cheap to clone; every clone refers to the same task.
pub struct Context<K> {
    handle: TaskHandle<K>,
    registry: Arc<Registry<K>>,
    idle_timeout: Option<Duration>,
}

impl<K: EventKind> Context<K> {
    pub(crate) fn new(
        handle: TaskHandle<K>,
        registry: Arc<Registry<K>>,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            handle,
            registry,
            idle_timeout,
        }
    }

    /// Id of the owning task.
    pub fn id(&self) -> TaskId {
        self.handle.id()
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Handle to this task, for giving to other tasks.
    pub fn handle(&self) -> &TaskHandle<K> {
        &self.handle
    }

    /// Registry the task belongs to while running.
    pub fn registry(&self) -> &Arc<Registry<K>> {
        &self.registry
    }

    /// Queue an event for this task.
    ///
    /// Posting from a handler during a drain is processed in the same drain.
    pub fn post(&self, event: Event<K>) {
        self.handle.post(event);
    }

    /// Ask this task to leave its loop after the current iteration.
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// True until the task is stopped.
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Post `event` to every other running task. Returns the receiver count.
    pub fn emit(&self, event: Event<K>) -> usize {
        let receivers = self.registry.broadcast(self.id(), &event);
        trace!(
            task = self.name(),
            event = event.kind().name(),
            receivers,
            "event emitted"
        );
        receivers
    }

    /// Number of events waiting in this task's queue.
    pub fn pending(&self) -> usize {
        self.handle.pending()
    }

    /// Take the oldest queued event.
    pub fn next_event(&self) -> Option<Event<K>> {
        self.handle.mailbox().pop()
    }

    /// Block until an event is queued or the task is stopped, bounded by the
    /// configured idle timeout. Returns true if events are pending.
    pub fn wait(&self) -> bool {
        self.handle.mailbox().wait(self.idle_timeout)
    }

    /// Like [`wait`](Self::wait) with an explicit bound.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.handle.mailbox().wait(Some(timeout))
    }

    /// Feed queued events to `behavior` until the queue is empty.
    ///
    /// Events posted while draining, including by the handlers themselves,
    /// are part of the same drain. Returns the number of events processed.
    /// Stops at the first handler error.
    pub fn drain<B>(&self, behavior: &mut B) -> Result<usize, HandlerError>
    where
        B: Behavior<K> + ?Sized,
    {
        let mut processed = 0;
        while let Some(event) = self.next_event() {
            behavior.process_event(self, event)?;
            processed += 1;
        }
        Ok(processed)
    }
}

impl<K> Clone for Context<K> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            registry: Arc::clone(&self.registry),
            idle_timeout: self.idle_timeout,
        }
    }
}

impl<K> fmt::Debug for Context<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("task", &self.handle)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

/// Handler context: adapter data plus the owning task's operations.
///
/// # Example
///
/// ```rust
/// use taskfsm::{Event, HandlerTable, Registry, TaskBuilder};
///
/// let registry = Registry::new();
/// let mut task = TaskBuilder::new("counter", &registry)
///     .threaded(false)
///     .build_with(|ctx| {
///         HandlerTable::new(ctx, 0u32)
///             .on("tick", |scope, _event| {
///                 scope.data += 1;
///                 Ok(())
///             })
///             .on("quit", |scope, _event| {
///                 scope.stop();
///                 Ok(())
///             })
///     });
///
/// task.post(Event::new("tick"));
/// task.post(Event::new("quit"));
/// task.start().unwrap();
/// ```
pub struct Scope<K, D> {
    pub data: D,
    ctx: Context<K>,
}

impl<K: EventKind, D> Scope<K, D> {
    /// Bundle `data` with the owning task's context.
    pub fn new(ctx: Context<K>, data: D) -> Self {
        Self { data, ctx }
    }

    /// The owning task's context.
    pub fn context(&self) -> &Context<K> {
        &self.ctx
    }

    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    /// Queue an event for the owning task.
    pub fn post(&self, event: Event<K>) {
        self.ctx.post(event);
    }

    /// Post to every other running task.
    pub fn emit(&self, event: Event<K>) -> usize {
        self.ctx.emit(event)
    }

    /// Ask the owning task to leave its loop.
    pub fn stop(&self) {
        self.ctx.stop();
    }

    pub fn is_running(&self) -> bool {
        self.ctx.is_running()
    }
}

impl<K, D: fmt::Debug> fmt::Debug for Scope<K, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("data", &self.data)
            .field("ctx", &self.ctx)
            .finish()
    }
}
