//! State transition history tracking.
//!
//! Keeps the most recent transitions a machine performed, for
//! introspection and diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use taskfsm::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "initializing".to_string(),
///     to: "connecting".to_string(),
///     trigger: "started".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to, "connecting");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being transitioned from
    pub from: String,
    /// The state being transitioned to
    pub to: String,
    /// Name of the event kind that fired the transition
    pub trigger: String,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered history of state transitions.
///
/// Once `limit` records are held, recording a new one drops the oldest.
/// A limit of zero disables recording.
///
/// # Example
///
/// ```rust
/// use taskfsm::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_limit(8);
/// for (from, to) in [("a", "b"), ("b", "c")] {
///     history.record(StateTransition {
///         from: from.to_string(),
///         to: to.to_string(),
///         trigger: "next".to_string(),
///         timestamp: Utc::now(),
///     });
/// }
///
/// assert_eq!(history.get_path(), vec!["a", "b", "c"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
    limit: usize,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::with_limit(crate::config::MachineConfig::default().history_limit)
    }
}

impl StateHistory {
    /// Create an empty history keeping at most `limit` records.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: Vec::new(),
            limit,
        }
    }

    /// Append a transition, evicting the oldest record when full.
    pub fn record(&mut self, transition: StateTransition) {
        if self.limit == 0 {
            return;
        }
        if self.transitions.len() == self.limit {
            self.transitions.remove(0);
        }
        self.transitions.push(transition);
    }

    /// Names of the states traversed: the first recorded source, then the
    /// target of each transition.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Time between the first and last recorded transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Most recent transition, if any.
    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.last()
    }

    /// Recorded transitions, oldest first.
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
