//! Task runtime.
//!
//! A task is an actor with its own FIFO event queue. Other threads post to
//! it through a [`TaskHandle`]; the task drains the queue on its own thread
//! (or on the caller of `start` when it is not threaded) and feeds each event
//! to its [`Behavior`]. Running tasks are members of a shared [`Registry`],
//! which is how [`Context::emit`] reaches every other task.
//!
//! # Example
//!
//! ```rust
//! use taskfsm::{Event, HandlerTable, Registry, TaskBuilder};
//! use std::time::Duration;
//!
//! let registry = Registry::new();
//! let mut echo = TaskBuilder::new("echo", &registry).build_with(|ctx| {
//!     HandlerTable::new(ctx, Vec::new())
//!         .on("say", |scope, event| {
//!             scope.data.push(event.value().clone());
//!             Ok(())
//!         })
//!         .on("quit", |scope, _event| {
//!             scope.stop();
//!             Ok(())
//!         })
//! });
//!
//! echo.start().unwrap();
//! echo.post(Event::with_value("say", "hello"));
//! echo.post(Event::new("quit"));
//! echo.join(Some(Duration::from_secs(5))).unwrap();
//! ```

mod behavior;
mod context;
mod error;
mod handle;
mod handlers;
pub(crate) mod mailbox;
mod registry;
mod runtime;

pub use behavior::Behavior;
pub use context::{Context, Scope};
pub use error::TaskError;
pub use handle::{TaskHandle, TaskId};
pub use handlers::HandlerTable;
pub use mailbox::Notify;
pub use registry::Registry;
pub use runtime::{Task, TaskBuilder};
