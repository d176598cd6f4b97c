//! State machine that dispatches events to named states.
//!
//! The machine has no concurrency of its own. It maps the pair
//! `(current state, event kind)` to a transition or an in-place handler and
//! reports what happened as a [`Dispatch`] so the caller can log it.

mod dispatch;
mod engine;

pub use dispatch::Dispatch;
pub use engine::StateMachine;
