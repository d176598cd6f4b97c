//! What a task does with its execution slot.

use super::context::Context;
use crate::core::{Event, EventKind, HandlerResult};

/// Behavior run by a [`Task`](super::Task).
///
/// Every method runs on the task's own thread (or on the caller of `start`
/// for tasks that are not threaded). Only `process_event` is required; the
/// defaults give a loop that sleeps until an event is posted and then
/// drains the queue.
///
/// Adapters override `routine` to interleave draining with their own
/// blocking call. The blocking call must be woken by the task's
/// [`Notify`](super::Notify) hook, otherwise posted events (including the
/// stop request) are not observed until it returns.
pub trait Behavior<K: EventKind>: Send + 'static {
    /// Setup inside the task's execution context, before the loop.
    fn run_pre(&mut self, _ctx: &Context<K>) -> HandlerResult {
        Ok(())
    }

    /// Teardown inside the task's execution context, after a clean loop exit.
    fn run_post(&mut self, _ctx: &Context<K>) -> HandlerResult {
        Ok(())
    }

    /// One loop iteration. Called repeatedly while the task is running.
    fn routine(&mut self, ctx: &Context<K>) -> HandlerResult {
        ctx.wait();
        ctx.drain(self).map(|_| ())
    }

    /// Handle one dequeued event.
    fn process_event(&mut self, ctx: &Context<K>, event: Event<K>) -> HandlerResult;
}
