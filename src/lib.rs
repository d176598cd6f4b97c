//! Taskfsm: event-driven tasks with declarative state machines
//!
//! Taskfsm pairs a small actor runtime with a state machine engine. Each
//! task owns a FIFO event queue and, optionally, a thread of its own. Any
//! thread may post to a task; a task may broadcast to every other running
//! task through the shared registry. A task's behavior is either a flat
//! handler table or a state machine whose states react to events with
//! transitions, in-place handlers and enter/leave hooks.
//!
//! # Core Concepts
//!
//! - **Event**: a kind plus an optional JSON payload
//! - **State machine**: named states, at most one current, dispatching events
//!   to transitions or handlers
//! - **Task**: queue, running flag and lifecycle hooks around a behavior
//! - **Registry**: the set of running tasks, used for broadcast
//!
//! # Example
//!
//! ```rust
//! use taskfsm::{Event, FsmTask, Registry, Scope, State, StateMachineBuilder, TaskBuilder};
//! use std::time::Duration;
//!
//! type Door = Scope<&'static str, u32>;
//!
//! let registry = Registry::new();
//! let mut door = TaskBuilder::new("door", &registry).build_with(|ctx| {
//!     let machine = StateMachineBuilder::new()
//!         .initial("closed")
//!         .state(State::new("closed").transition("open", "opened"))
//!         .state(
//!             State::new("opened")
//!                 .transition("close", "closed")
//!                 .handler("lock", |door: &mut Door, _event| {
//!                     door.stop();
//!                     Ok(())
//!                 })
//!                 .on_enter(|door: &mut Door, _event| {
//!                     door.data += 1;
//!                     Ok(())
//!                 }),
//!         )
//!         .build()
//!         .unwrap();
//!     FsmTask::new(ctx, machine, 0)
//! });
//!
//! door.start().unwrap();
//! door.post(Event::new("open"));
//! door.post(Event::new("lock"));
//! door.join(Some(Duration::from_secs(5))).unwrap();
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod fsm_task;
pub mod machine;
pub mod task;

// Re-export commonly used types
pub use builder::{BuildError, DefinitionError, StateMachineBuilder};
pub use config::{MachineConfig, TaskConfig};
pub use crate::core::{Event, EventKind, HandlerError, HandlerResult, State};
pub use fsm_task::FsmTask;
pub use machine::{Dispatch, StateMachine};
pub use task::{
    Behavior, Context, HandlerTable, Notify, Registry, Scope, Task, TaskBuilder, TaskError,
    TaskHandle, TaskId,
};
