//! Named states holding transitions, handlers and enter/leave hooks.

use super::event::{Event, EventKind};
use super::handler::{Handler, HandlerError, HandlerResult};
use super::transition::Transition;
use std::collections::HashMap;
use std::fmt;

/// Node of a state machine.
///
/// A state reacts to an event kind either by moving to another state
/// (a [`Transition`]) or by running a handler in place. When both are
/// registered for the same kind the transition wins.
///
/// # Example
///
/// ```rust
/// use taskfsm::core::State;
///
/// let idling: State<&'static str, Vec<String>> = State::new("idling")
///     .transition("stop", "stopped")
///     .handler("next", |log: &mut Vec<String>, _event| {
///         log.push("next".to_string());
///         Ok(())
///     })
///     .on_enter(|log: &mut Vec<String>, _event| {
///         log.push("entered".to_string());
///         Ok(())
///     });
///
/// assert_eq!(idling.name(), "idling");
/// assert!(idling.find_transition(&"stop").is_some());
/// assert!(idling.has_handler(&"next"));
/// ```
pub struct State<K: EventKind, C> {
    name: String,
    transitions: HashMap<K, Transition>,
    handlers: HashMap<K, Handler<K, C>>,
    enter: Option<Handler<K, C>>,
    leave: Option<Handler<K, C>>,
}

impl<K: EventKind, C> State<K, C> {
    /// Creates a state with no transitions, handlers or hooks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: HashMap::new(),
            handlers: HashMap::new(),
            enter: None,
            leave: None,
        }
    }

    /// Unique name of this state within its machine.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Move to `next_state` when an event of `kind` arrives.
    pub fn transition(mut self, kind: K, next_state: impl Into<String>) -> Self {
        self.transitions.insert(kind, Transition::to(next_state));
        self
    }

    /// Run `handler` in place when an event of `kind` arrives.
    pub fn handler<F>(mut self, kind: K, handler: F) -> Self
    where
        F: FnMut(&mut C, &Event<K>) -> HandlerResult + Send + 'static,
    {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// Hook run with the triggering event after this state becomes current.
    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut C, &Event<K>) -> HandlerResult + Send + 'static,
    {
        self.enter = Some(Box::new(hook));
        self
    }

    /// Hook run with the triggering event before this state is left.
    pub fn on_leave<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut C, &Event<K>) -> HandlerResult + Send + 'static,
    {
        self.leave = Some(Box::new(hook));
        self
    }

    /// Transition registered for `kind`, if any.
    pub fn find_transition(&self, kind: &K) -> Option<&Transition> {
        self.transitions.get(kind)
    }

    /// True if an in-place handler is registered for `kind`.
    pub fn has_handler(&self, kind: &K) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn has_enter(&self) -> bool {
        self.enter.is_some()
    }

    pub fn has_leave(&self) -> bool {
        self.leave.is_some()
    }

    /// All transitions defined on this state.
    pub fn transitions(&self) -> impl Iterator<Item = (&K, &Transition)> {
        self.transitions.iter()
    }

    /// Event kinds with an in-place handler.
    pub fn handled_kinds(&self) -> impl Iterator<Item = &K> {
        self.handlers.keys()
    }

    /// Run the handler registered for the event's kind.
    ///
    /// Returns `Ok(false)` when no handler matches.
    pub(crate) fn handle(&mut self, ctx: &mut C, event: &Event<K>) -> Result<bool, HandlerError> {
        match self.handlers.get_mut(event.kind()) {
            Some(handler) => handler(ctx, event).map(|_| true),
            None => Ok(false),
        }
    }

    pub(crate) fn enter(&mut self, ctx: &mut C, event: &Event<K>) -> HandlerResult {
        match self.enter.as_mut() {
            Some(hook) => hook(ctx, event),
            None => Ok(()),
        }
    }

    pub(crate) fn leave(&mut self, ctx: &mut C, event: &Event<K>) -> HandlerResult {
        match self.leave.as_mut() {
            Some(hook) => hook(ctx, event),
            None => Ok(()),
        }
    }
}

impl<K: EventKind, C> fmt::Debug for State<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("enter", &self.enter.is_some())
            .field("leave", &self.leave.is_some())
            .finish()
    }
}
