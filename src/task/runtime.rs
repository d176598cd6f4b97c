//! # Task lifecycle.
//!
//! ```text
//! start() ──► [thread spawn] ──► register in Registry
//!                                  ├─► run_pre
//!                                  ├─► while running { routine }
//!                                  ├─► run_post        (clean exit only)
//!                                  └─► deregister      (always, even on panic)
//! ```
//!
//! A task that is not threaded runs this sequence on the caller of
//! `start`, which returns when the loop exits.

use super::behavior::Behavior;
use super::context::Context;
use super::error::TaskError;
use super::handle::{TaskHandle, TaskId};
use super::mailbox::{Mailbox, Notify};
use super::registry::Registry;
use crate::config::TaskConfig;
use crate::core::{Event, EventKind, HandlerError};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

/// Builder for [`Task`].
pub struct TaskBuilder<K> {
    name: String,
    registry: Arc<Registry<K>>,
    config: TaskConfig,
    notify: Option<Arc<dyn Notify>>,
}

impl<K: EventKind> TaskBuilder<K> {
    /// Start building a task named `name` that joins `registry` while running.
    pub fn new(name: impl Into<String>, registry: &Arc<Registry<K>>) -> Self {
        Self {
            name: name.into(),
            registry: Arc::clone(registry),
            config: TaskConfig::default(),
            notify: None,
        }
    }

    /// Replace the whole task configuration.
    pub fn config(mut self, config: TaskConfig) -> Self {
        self.config = config;
        self
    }

    /// Run on a dedicated thread (default) or on the caller of `start`.
    pub fn threaded(mut self, threaded: bool) -> Self {
        self.config.threaded = threaded;
        self
    }

    /// Bound each blocking wait of the default routine.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Extra wake-up hook for behaviors that block outside the mailbox.
    pub fn notify(mut self, notify: impl Notify + 'static) -> Self {
        self.notify = Some(Arc::new(notify));
        self
    }

    /// Build a task running `behavior`.
    pub fn build<B: Behavior<K>>(self, behavior: B) -> Task<K> {
        self.build_with(|_| behavior)
    }

    /// Build a task whose behavior needs the task's own [`Context`].
    pub fn build_with<B, F>(self, make: F) -> Task<K>
    where
        B: Behavior<K>,
        F: FnOnce(Context<K>) -> B,
    {
        let handle = TaskHandle::new(&self.name, Mailbox::new(self.notify));
        let context = Context::new(handle.clone(), self.registry, self.config.idle_timeout);
        let behavior = make(context.clone());
        Task {
            handle,
            context,
            config: self.config,
            behavior: Some(Box::new(behavior)),
            thread: None,
            exit: Arc::new(ExitSignal::default()),
        }
    }
}

/// Queued-event actor, optionally backed by its own thread.
///
/// # Example
///
/// ```rust
/// use taskfsm::{Event, HandlerTable, Registry, TaskBuilder};
///
/// let registry = Registry::new();
/// let mut task = TaskBuilder::new("worker", &registry).build_with(|ctx| {
///     HandlerTable::new(ctx, ()).on("quit", |scope, _event| {
///         scope.stop();
///         Ok(())
///     })
/// });
///
/// task.start().unwrap();
/// task.post(Event::new("quit"));
/// task.join(None).unwrap();
/// assert!(registry.is_empty());
/// ```
pub struct Task<K: EventKind> {
    handle: TaskHandle<K>,
    context: Context<K>,
    config: TaskConfig,
    behavior: Option<Box<dyn Behavior<K>>>,
    thread: Option<JoinHandle<Result<(), TaskError>>>,
    exit: Arc<ExitSignal>,
}

impl<K: EventKind> Task<K> {
    /// Returns the task's unique id.
    pub fn id(&self) -> TaskId {
        self.handle.id()
    }

    /// Returns the task name.
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Cloneable handle for posting from other threads.
    pub fn handle(&self) -> &TaskHandle<K> {
        &self.handle
    }

    pub fn is_threaded(&self) -> bool {
        self.config.threaded
    }

    /// True between `start` and the end of the loop.
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Start the task.
    ///
    /// A threaded task spawns its thread and returns immediately. Otherwise
    /// the whole lifecycle runs on the calling thread and its outcome is
    /// returned.
    pub fn start(&mut self) -> Result<(), TaskError> {
        let behavior = self.behavior.take().ok_or_else(|| TaskError::AlreadyStarted {
            task: self.name().to_string(),
        })?;
        self.handle.mailbox().start();

        if !self.config.threaded {
            return run(behavior, &self.context);
        }

        let mut builder = thread::Builder::new().name(self.name().to_string());
        if let Some(size) = self.config.thread_stack_size {
            builder = builder.stack_size(size);
        }

        // The thread takes the behavior on entry; a failed spawn leaves it
        // here so `start` can be retried.
        let slot = Arc::new(Mutex::new(Some(behavior)));
        let spawned = {
            let slot = Arc::clone(&slot);
            let context = self.context.clone();
            let exit = Arc::clone(&self.exit);
            builder.spawn(move || {
                let _exit = ExitGuard(exit);
                match lock(&slot).take() {
                    Some(behavior) => run(behavior, &context),
                    None => Ok(()),
                }
            })
        };

        match spawned {
            Ok(thread) => {
                self.thread = Some(thread);
                Ok(())
            }
            Err(source) => {
                self.behavior = lock(&slot).take();
                self.handle.mailbox().finish();
                Err(TaskError::Spawn {
                    task: self.name().to_string(),
                    source,
                })
            }
        }
    }

    /// Ask the task to leave its loop. Cooperative: an iteration in progress
    /// finishes first.
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Wait for the task's thread to exit and return its outcome.
    ///
    /// Returns `Ok(())` at once for tasks without a thread. When `timeout`
    /// elapses first, returns [`TaskError::JoinTimeout`] and the task can be
    /// joined again later.
    pub fn join(&mut self, timeout: Option<Duration>) -> Result<(), TaskError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        if let Some(timeout) = timeout {
            if !self.exit.wait(timeout) {
                self.thread = Some(thread);
                return Err(TaskError::JoinTimeout {
                    task: self.name().to_string(),
                    timeout,
                });
            }
        }

        match thread.join() {
            Ok(outcome) => outcome,
            Err(payload) => Err(TaskError::Panicked {
                task: self.name().to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    /// Queue an event for the task. Safe from any thread, never fails.
    pub fn post(&self, event: Event<K>) {
        self.handle.post(event);
    }
}

impl<K: EventKind> fmt::Debug for Task<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("handle", &self.handle)
            .field("config", &self.config)
            .field("started", &self.behavior.is_none())
            .finish()
    }
}

type BehaviorSlot<K> = Mutex<Option<Box<dyn Behavior<K>>>>;

fn lock<K: EventKind>(slot: &BehaviorSlot<K>) -> MutexGuard<'_, Option<Box<dyn Behavior<K>>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Execute the full lifecycle on the current thread.
fn run<K: EventKind>(
    mut behavior: Box<dyn Behavior<K>>,
    ctx: &Context<K>,
) -> Result<(), TaskError> {
    let _membership = Membership::enter(ctx);
    info!(task = ctx.name(), id = %ctx.id(), "task started");

    let outcome = run_loop(behavior.as_mut(), ctx);
    match &outcome {
        Ok(()) => info!(task = ctx.name(), "task exited"),
        Err(err) => error!(task = ctx.name(), error = %err, "task failed"),
    }

    outcome.map_err(|source| TaskError::Handler {
        task: ctx.name().to_string(),
        source,
    })
}

fn run_loop<K: EventKind>(
    behavior: &mut dyn Behavior<K>,
    ctx: &Context<K>,
) -> Result<(), HandlerError> {
    behavior.run_pre(ctx)?;
    while ctx.is_running() {
        behavior.routine(ctx)?;
    }
    behavior.run_post(ctx)
}

/// Registry membership for the duration of a run.
///
/// Leaving clears the running flag, so a failed or panicked task reports as
/// stopped, and drops events still queued. Neither step calls the task's
/// notify hook.
struct Membership<'a, K: EventKind> {
    ctx: &'a Context<K>,
}

impl<'a, K: EventKind> Membership<'a, K> {
    fn enter(ctx: &'a Context<K>) -> Self {
        ctx.registry().register(ctx.handle().clone());
        Self { ctx }
    }
}

impl<K: EventKind> Drop for Membership<'_, K> {
    fn drop(&mut self) {
        self.ctx.registry().deregister(self.ctx.id());
        let mailbox = self.ctx.handle().mailbox();
        mailbox.finish();
        let dropped = mailbox.clear();
        if dropped > 0 {
            debug!(task = self.ctx.name(), dropped, "discarded events queued at exit");
        }
    }
}

/// Set once the task's thread has finished, whether it returned or panicked.
#[derive(Default)]
struct ExitSignal {
    done: Mutex<bool>,
    cond: Condvar,
}

impl ExitSignal {
    fn set(&self) {
        *self.done.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.cond.notify_all();
    }

    fn wait(&self, timeout: Duration) -> bool {
        let done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        let (done, _) = self
            .cond
            .wait_timeout_while(done, timeout, |done| !*done)
            .unwrap_or_else(PoisonError::into_inner);
        *done
    }
}

struct ExitGuard(Arc<ExitSignal>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.set();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
