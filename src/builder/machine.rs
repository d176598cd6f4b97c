//! Builder for constructing validated state machines.

use crate::builder::error::{BuildError, DefinitionError};
use crate::config::MachineConfig;
use crate::core::{EventKind, State};
use crate::machine::StateMachine;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<DefinitionError>>;

/// Builder for constructing state machines with a fluent API.
///
/// Unlike [`StateMachine::new`], `build` rejects definitions that would only
/// misbehave at runtime, and reports all of their defects at once.
///
/// # Example
///
/// ```rust
/// use taskfsm::builder::StateMachineBuilder;
/// use taskfsm::core::State;
///
/// let machine = StateMachineBuilder::<&'static str, ()>::new()
///     .initial("initializing")
///     .state(State::new("initializing").transition("started", "connecting"))
///     .state(State::new("connecting").transition("connected", "idling"))
///     .state(State::new("idling"))
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.current_state(), "initializing");
/// ```
pub struct StateMachineBuilder<K: EventKind, C> {
    initial: Option<String>,
    states: Vec<State<K, C>>,
    config: MachineConfig,
}

impl<K: EventKind, C> StateMachineBuilder<K, C> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            states: Vec::new(),
            config: MachineConfig::default(),
        }
    }

    /// Set the initial state name (required).
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Add a state.
    pub fn state(mut self, state: State<K, C>) -> Self {
        self.states.push(state);
        self
    }

    /// Add multiple states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = State<K, C>>) -> Self {
        self.states.extend(states);
        self
    }

    /// Set history settings for the built machine.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Check the definition, accumulating every violation.
    pub fn validate(&self) -> Check {
        let mut checks: Vec<Check> = Vec::new();

        if self.states.is_empty() {
            checks.push(Validation::fail(DefinitionError::NoStates));
        }

        let mut names = HashSet::new();
        for state in &self.states {
            if !names.insert(state.name()) {
                checks.push(Validation::fail(DefinitionError::DuplicateState {
                    name: state.name().to_string(),
                }));
            }
        }

        match &self.initial {
            None => checks.push(Validation::fail(DefinitionError::MissingInitialState)),
            Some(initial) if !self.states.is_empty() && !names.contains(initial.as_str()) => {
                checks.push(Validation::fail(DefinitionError::UnknownInitialState {
                    name: initial.clone(),
                }));
            }
            Some(_) => {}
        }

        for state in &self.states {
            for (kind, transition) in state.transitions() {
                if state.has_handler(kind) {
                    checks.push(Validation::fail(DefinitionError::ConflictingDispatch {
                        state: state.name().to_string(),
                        event: kind.name().to_string(),
                    }));
                }
                if !names.contains(transition.next_state.as_str()) {
                    checks.push(Validation::fail(DefinitionError::UnknownTarget {
                        state: state.name().to_string(),
                        event: kind.name().to_string(),
                        target: transition.next_state.clone(),
                    }));
                }
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Build the state machine.
    /// Returns every definition defect if validation fails.
    pub fn build(self) -> Result<StateMachine<K, C>, BuildError> {
        if let Validation::Failure(errors) = self.validate() {
            return Err(BuildError::Invalid {
                violations: errors.iter().cloned().collect(),
            });
        }

        let initial = self.initial.unwrap_or_default();
        Ok(StateMachine::with_config(self.states, initial, &self.config))
    }
}

impl<K: EventKind, C> Default for StateMachineBuilder<K, C> {
    fn default() -> Self {
        Self::new()
    }
}
