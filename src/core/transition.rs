//! Transitions between named states.

use serde::{Deserialize, Serialize};

/// Event-triggered move to a named target state.
///
/// The target is resolved by name when the transition fires, so states may
/// reference states defined later (or themselves).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub next_state: String,
}

impl Transition {
    /// Transition into the state named `next_state`.
    pub fn to(next_state: impl Into<String>) -> Self {
        Self {
            next_state: next_state.into(),
        }
    }
}
