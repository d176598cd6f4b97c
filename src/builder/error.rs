//! Errors reported when building state machines.

use thiserror::Error;

/// A single defect in a state machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Initial state not specified. Call .initial(name) before .build()")]
    MissingInitialState,

    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("Initial state '{name}' is not defined")]
    UnknownInitialState { name: String },

    #[error("State '{name}' is defined more than once")]
    DuplicateState { name: String },

    #[error("State '{state}' has both a transition and a handler for event '{event}'")]
    ConflictingDispatch { state: String, event: String },

    #[error("Transition on '{event}' from state '{state}' targets undefined state '{target}'")]
    UnknownTarget {
        state: String,
        event: String,
        target: String,
    },
}

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Every defect found in the definition, not just the first one.
    #[error(
        "Invalid state machine definition ({} violation(s)): {}",
        .violations.len(),
        join(.violations)
    )]
    Invalid { violations: Vec<DefinitionError> },
}

impl BuildError {
    /// Every violation found, in check order.
    pub fn violations(&self) -> &[DefinitionError] {
        match self {
            Self::Invalid { violations } => violations,
        }
    }
}

fn join(violations: &[DefinitionError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
