//! Event-driven state machine over named states.

use super::dispatch::Dispatch;
use crate::config::MachineConfig;
use crate::core::{Event, EventKind, HandlerError, State, StateHistory, StateTransition};
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;

/// State machine that owns its states and the name of the current one.
///
/// `C` is the context handed to every handler and hook.
///
/// # Example
///
/// ```rust
/// use taskfsm::core::{Event, State};
/// use taskfsm::machine::{Dispatch, StateMachine};
///
/// let mut machine: StateMachine<&'static str, u32> = StateMachine::new(
///     [
///         State::new("closed").transition("open", "opened"),
///         State::new("opened")
///             .transition("close", "closed")
///             .handler("knock", |knocks: &mut u32, _event| {
///                 *knocks += 1;
///                 Ok(())
///             }),
///     ],
///     "closed",
/// );
///
/// let mut knocks = 0;
/// machine.handle_event(&mut knocks, &Event::new("open")).unwrap();
/// assert_eq!(machine.current_state(), "opened");
///
/// let outcome = machine.handle_event(&mut knocks, &Event::new("knock")).unwrap();
/// assert_eq!(outcome, Dispatch::Handled);
/// assert_eq!(knocks, 1);
/// ```
pub struct StateMachine<K: EventKind, C> {
    states: HashMap<String, State<K, C>>,
    current: String,
    history: StateHistory,
}

impl<K: EventKind, C> StateMachine<K, C> {
    /// Create a machine positioned on `initial`.
    ///
    /// No validation happens here: an unknown `initial` makes every dispatch
    /// a no-op, and a later state with a duplicate name replaces the earlier
    /// one. Use [`StateMachineBuilder`](crate::builder::StateMachineBuilder)
    /// to reject such definitions.
    pub fn new(states: impl IntoIterator<Item = State<K, C>>, initial: impl Into<String>) -> Self {
        Self::with_config(states, initial, &MachineConfig::default())
    }

    /// Like [`new`](Self::new), with explicit history settings.
    pub fn with_config(
        states: impl IntoIterator<Item = State<K, C>>,
        initial: impl Into<String>,
        config: &MachineConfig,
    ) -> Self {
        let states = states
            .into_iter()
            .map(|state| (state.name().to_string(), state))
            .collect();
        Self {
            states,
            current: initial.into(),
            history: StateHistory::with_limit(config.history_limit),
        }
    }

    /// Name of the current state.
    pub fn current_state(&self) -> &str {
        &self.current
    }

    /// True if `name` is the current state.
    pub fn is_in(&self, name: &str) -> bool {
        self.current == name
    }

    /// Look up a state by name.
    pub fn state(&self, name: &str) -> Option<&State<K, C>> {
        self.states.get(name)
    }

    /// True if a state called `name` exists.
    pub fn contains_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Sorted names of all states.
    pub fn state_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.states.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Most recent transitions, oldest first.
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Dispatch one event.
    ///
    /// A transition registered for the event's kind takes priority over a
    /// handler. When a transition fires, the current state's `leave` hook
    /// runs, the current state changes, then the target's `enter` hook runs,
    /// each with `event`. A transition whose target does not exist is
    /// aborted without running anything.
    ///
    /// Handler errors propagate unchanged. If `leave` fails the state is
    /// unchanged; if `enter` fails the state has already changed.
    pub fn handle_event(
        &mut self,
        ctx: &mut C,
        event: &Event<K>,
    ) -> Result<Dispatch, HandlerError> {
        let Some(state) = self.states.get(&self.current) else {
            return Ok(Dispatch::NoState {
                name: self.current.clone(),
            });
        };

        let Some(next) = state
            .find_transition(event.kind())
            .map(|transition| transition.next_state.clone())
        else {
            let handled = match self.states.get_mut(&self.current) {
                Some(state) => state.handle(ctx, event)?,
                None => false,
            };
            return Ok(if handled {
                Dispatch::Handled
            } else {
                Dispatch::Unhandled
            });
        };

        if !self.states.contains_key(&next) {
            return Ok(Dispatch::BrokenTransition {
                from: self.current.clone(),
                to: next,
            });
        }

        if let Some(state) = self.states.get_mut(&self.current) {
            state.leave(ctx, event)?;
        }

        let from = std::mem::replace(&mut self.current, next.clone());
        self.history.record(StateTransition {
            from: from.clone(),
            to: next.clone(),
            trigger: event.kind().name().to_string(),
            timestamp: Utc::now(),
        });

        if let Some(target) = self.states.get_mut(&next) {
            target.enter(ctx, event)?;
        }

        Ok(Dispatch::Transitioned { from, to: next })
    }
}

impl<K: EventKind, C> fmt::Debug for StateMachine<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("states", &self.state_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    /// Records every callback the machine makes.
    #[derive(Default)]
    struct Machine {
        toggle_flag: bool,
        register: Option<Value>,
        left_one_register: Option<Value>,
        entered_two_register: Option<Value>,
        calls: Vec<&'static str>,
    }

    type Kind = &'static str;

    fn states() -> Vec<State<Kind, Machine>> {
        vec![
            State::new("one")
                .transition("switch", "two")
                .handler("toggle", |m: &mut Machine, _e: &Event<Kind>| {
                    m.toggle_flag = true;
                    m.calls.push("toggle");
                    Ok(())
                })
                .handler("set", |m: &mut Machine, e: &Event<Kind>| {
                    m.register = Some(e.value().clone());
                    Ok(())
                })
                .on_leave(|m: &mut Machine, e: &Event<Kind>| {
                    m.left_one_register = Some(e.value().clone());
                    m.calls.push("leave one");
                    Ok(())
                }),
            State::new("two").on_enter(|m: &mut Machine, e: &Event<Kind>| {
                m.entered_two_register = Some(e.value().clone());
                m.calls.push("enter two");
                Ok(())
            }),
        ]
    }

    fn machine() -> StateMachine<Kind, Machine> {
        StateMachine::new(states(), "one")
    }

    #[test]
    fn initial_state_is_current() {
        let machine = machine();
        assert_eq!(machine.current_state(), "one");
        assert!(machine.is_in("one"));
        assert_eq!(machine.state_names(), vec!["one", "two"]);
    }

    #[test]
    fn transition_changes_state() {
        let mut fsm = machine();
        let mut m = Machine::default();

        let outcome = fsm.handle_event(&mut m, &Event::new("switch")).unwrap();

        assert_eq!(
            outcome,
            Dispatch::Transitioned {
                from: "one".into(),
                to: "two".into()
            }
        );
        assert_eq!(fsm.current_state(), "two");
    }

    #[test]
    fn handler_runs_without_changing_state() {
        let mut fsm = machine();
        let mut m = Machine::default();

        let outcome = fsm.handle_event(&mut m, &Event::new("toggle")).unwrap();

        assert_eq!(outcome, Dispatch::Handled);
        assert!(m.toggle_flag);
        assert_eq!(fsm.current_state(), "one");
    }

    #[test]
    fn event_value_reaches_handler() {
        let mut fsm = machine();
        let mut m = Machine::default();

        fsm.handle_event(&mut m, &Event::with_value("set", 1)).unwrap();

        assert_eq!(m.register, Some(Value::from(1)));
    }

    #[test]
    fn leave_and_enter_receive_event_value_in_order() {
        let mut fsm = machine();
        let mut m = Machine::default();

        fsm.handle_event(&mut m, &Event::new("toggle")).unwrap();
        assert_eq!(fsm.current_state(), "one");

        fsm.handle_event(&mut m, &Event::with_value("switch", 7)).unwrap();

        assert_eq!(m.left_one_register, Some(Value::from(7)));
        assert_eq!(m.entered_two_register, Some(Value::from(7)));
        assert_eq!(m.calls, vec!["toggle", "leave one", "enter two"]);
        assert_eq!(fsm.current_state(), "two");
    }

    #[test]
    fn unmatched_event_is_dropped() {
        let mut fsm = machine();
        let mut m = Machine::default();

        let outcome = fsm.handle_event(&mut m, &Event::new("unknown")).unwrap();

        assert_eq!(outcome, Dispatch::Unhandled);
        assert_eq!(fsm.current_state(), "one");
        assert!(m.calls.is_empty());
    }

    #[test]
    fn broken_transition_is_aborted() {
        let mut fsm: StateMachine<Kind, Machine> = StateMachine::new(
            [State::new("one")
                .transition("jump", "missing")
                .on_leave(|m: &mut Machine, _e: &Event<Kind>| {
                    m.calls.push("leave one");
                    Ok(())
                })],
            "one",
        );
        let mut m = Machine::default();

        let outcome = fsm.handle_event(&mut m, &Event::new("jump")).unwrap();

        assert_eq!(
            outcome,
            Dispatch::BrokenTransition {
                from: "one".into(),
                to: "missing".into()
            }
        );
        assert_eq!(fsm.current_state(), "one");
        assert!(m.calls.is_empty());
        assert!(fsm.history().transitions().is_empty());
    }

    #[test]
    fn unknown_current_state_is_a_no_op() {
        let mut fsm: StateMachine<Kind, Machine> = StateMachine::new(states(), "nowhere");
        let mut m = Machine::default();

        let outcome = fsm.handle_event(&mut m, &Event::new("toggle")).unwrap();

        assert_eq!(
            outcome,
            Dispatch::NoState {
                name: "nowhere".into()
            }
        );
        assert!(!m.toggle_flag);
    }

    #[test]
    fn transition_wins_over_handler_for_same_kind() {
        let mut fsm: StateMachine<Kind, Machine> = StateMachine::new(
            [
                State::new("one")
                    .transition("go", "two")
                    .handler("go", |m: &mut Machine, _e: &Event<Kind>| {
                        m.calls.push("handler");
                        Ok(())
                    }),
                State::new("two"),
            ],
            "one",
        );
        let mut m = Machine::default();

        fsm.handle_event(&mut m, &Event::new("go")).unwrap();

        assert_eq!(fsm.current_state(), "two");
        assert!(m.calls.is_empty());
    }

    #[test]
    fn self_loop_runs_leave_then_enter_on_same_state() {
        let mut fsm: StateMachine<Kind, Machine> = StateMachine::new(
            [State::new("loop")
                .transition("again", "loop")
                .on_leave(|m: &mut Machine, _e: &Event<Kind>| {
                    m.calls.push("leave");
                    Ok(())
                })
                .on_enter(|m: &mut Machine, _e: &Event<Kind>| {
                    m.calls.push("enter");
                    Ok(())
                })],
            "loop",
        );
        let mut m = Machine::default();

        fsm.handle_event(&mut m, &Event::new("again")).unwrap();

        assert_eq!(fsm.current_state(), "loop");
        assert_eq!(m.calls, vec!["leave", "enter"]);
    }

    #[test]
    fn failing_leave_keeps_state() {
        let mut fsm: StateMachine<Kind, ()> = StateMachine::new(
            [
                State::new("one")
                    .transition("switch", "two")
                    .on_leave(|_: &mut (), _e: &Event<Kind>| Err(HandlerError::msg("refused"))),
                State::new("two"),
            ],
            "one",
        );

        let result = fsm.handle_event(&mut (), &Event::new("switch"));

        assert!(result.is_err());
        assert_eq!(fsm.current_state(), "one");
    }

    #[test]
    fn failing_enter_has_already_moved() {
        let mut fsm: StateMachine<Kind, ()> = StateMachine::new(
            [
                State::new("one").transition("switch", "two"),
                State::new("two")
                    .on_enter(|_: &mut (), _e: &Event<Kind>| Err(HandlerError::msg("handshake"))),
            ],
            "one",
        );

        let result = fsm.handle_event(&mut (), &Event::new("switch"));

        assert!(result.is_err());
        assert_eq!(fsm.current_state(), "two");
    }

    #[test]
    fn transitions_are_recorded_in_history() {
        let mut fsm = machine();
        let mut m = Machine::default();

        fsm.handle_event(&mut m, &Event::new("toggle")).unwrap();
        fsm.handle_event(&mut m, &Event::new("switch")).unwrap();

        let history = fsm.history();
        assert_eq!(history.transitions().len(), 1);
        assert_eq!(history.get_path(), vec!["one", "two"]);
        assert_eq!(history.last().map(|t| t.trigger.as_str()), Some("switch"));
    }

    #[test]
    fn history_limit_comes_from_config() {
        let fsm: StateMachine<Kind, Machine> =
            StateMachine::with_config(states(), "one", &MachineConfig { history_limit: 3 });
        assert_eq!(fsm.history().limit(), 3);
    }
}
