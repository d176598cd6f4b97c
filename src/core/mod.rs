//! Core event and state machine types.
//!
//! This module contains the building blocks shared by the machine and the
//! task runtime:
//! - Events and the `EventKind` trait used as the dispatch key
//! - Named states with transitions, handlers and enter/leave hooks
//! - Bounded transition history
//!
//! Nothing in this module spawns threads or takes locks.

mod event;
mod handler;
mod history;
mod state;
mod transition;

pub use event::{Event, EventKind};
pub use handler::{Handler, HandlerError, HandlerResult};
pub use history::{StateHistory, StateTransition};
pub use state::State;
pub use transition::Transition;
