//! A task whose events are dispatched through a state machine.
//!
//! [`FsmTask`] owns a [`StateMachine`] whose handlers receive a
//! [`Scope`]: the task's adapter data together with its [`Context`]. Enter
//! hooks can therefore post follow-up events to their own task, and those
//! events are processed in the same drain.
//!
//! # Example
//!
//! ```rust
//! use taskfsm::{Event, FsmTask, Registry, Scope, State, StateMachine, TaskBuilder};
//!
//! type Link = Scope<&'static str, Vec<String>>;
//!
//! let registry = Registry::new();
//! let mut task = TaskBuilder::new("link", &registry)
//!     .threaded(false)
//!     .build_with(|ctx| {
//!         let machine = StateMachine::new(
//!             [
//!                 State::new("down")
//!                     .transition("up", "up")
//!                     .on_enter(|link: &mut Link, _event| {
//!                         link.data.push("down".into());
//!                         Ok(())
//!                     }),
//!                 State::new("up")
//!                     .transition("quit", "down")
//!                     .on_enter(|link: &mut Link, _event| {
//!                         link.data.push("up".into());
//!                         Ok(())
//!                     })
//!                     .on_leave(|link: &mut Link, _event| {
//!                         link.stop();
//!                         Ok(())
//!                     }),
//!             ],
//!             "down",
//!         );
//!         FsmTask::new(ctx, machine, Vec::new())
//!     });
//!
//! task.post(Event::new("up"));
//! task.post(Event::new("quit"));
//! task.start().unwrap();
//! ```

use crate::core::{Event, EventKind, HandlerError, HandlerResult};
use crate::machine::{Dispatch, StateMachine};
use crate::task::{Behavior, Context, Scope};
use tracing::{debug, warn};

/// Behavior that feeds every dequeued event to a state machine.
pub struct FsmTask<K: EventKind, D> {
    machine: StateMachine<K, Scope<K, D>>,
    scope: Scope<K, D>,
    start_event: Option<Event<K>>,
}

impl<K: EventKind, D> FsmTask<K, D> {
    /// Wrap `machine`, handing its handlers a scope over `data`.
    pub fn new(ctx: Context<K>, machine: StateMachine<K, Scope<K, D>>, data: D) -> Self {
        Self {
            machine,
            scope: Scope::new(ctx, data),
            start_event: None,
        }
    }

    /// Post `event` to the task as soon as it starts, ahead of anything
    /// posted later from its own thread.
    pub fn start_with(mut self, event: Event<K>) -> Self {
        self.start_event = Some(event);
        self
    }

    /// The wrapped machine, for introspection.
    pub fn machine(&self) -> &StateMachine<K, Scope<K, D>> {
        &self.machine
    }

    /// Scope passed to the machine's handlers.
    pub fn scope(&self) -> &Scope<K, D> {
        &self.scope
    }

    /// Adapter data owned by the scope.
    pub fn data(&self) -> &D {
        &self.scope.data
    }

    /// Name of the machine's current state.
    pub fn current_state(&self) -> &str {
        self.machine.current_state()
    }

    /// Run one event through the machine.
    pub fn dispatch(&mut self, event: &Event<K>) -> Result<Dispatch, HandlerError> {
        let outcome = self.machine.handle_event(&mut self.scope, event)?;
        match &outcome {
            Dispatch::Transitioned { from, to } => debug!(
                task = self.scope.name(),
                event = event.kind().name(),
                from = from.as_str(),
                to = to.as_str(),
                outcome = outcome.as_label(),
                "state changed"
            ),
            Dispatch::BrokenTransition { from, to } => warn!(
                task = self.scope.name(),
                event = event.kind().name(),
                from = from.as_str(),
                to = to.as_str(),
                outcome = outcome.as_label(),
                "transition target does not exist"
            ),
            Dispatch::NoState { name } => debug!(
                task = self.scope.name(),
                state = name.as_str(),
                outcome = outcome.as_label(),
                "current state does not exist"
            ),
            Dispatch::Unhandled => debug!(
                task = self.scope.name(),
                state = self.machine.current_state(),
                event = event.kind().name(),
                outcome = outcome.as_label(),
                "event not handled"
            ),
            Dispatch::Handled => {}
        }
        Ok(outcome)
    }
}

impl<K, D> Behavior<K> for FsmTask<K, D>
where
    K: EventKind,
    D: Send + 'static,
{
    fn run_pre(&mut self, ctx: &Context<K>) -> HandlerResult {
        if let Some(event) = self.start_event.take() {
            ctx.post(event);
        }
        Ok(())
    }

    fn process_event(&mut self, _ctx: &Context<K>, event: Event<K>) -> HandlerResult {
        self.dispatch(&event).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::State;
    use crate::task::{Registry, TaskBuilder};
    use std::sync::mpsc;
    use std::time::Duration;

    type Kind = &'static str;
    type Observer = Scope<Kind, mpsc::Sender<String>>;

    fn note(scope: &mut Observer, text: &str) {
        scope.data.send(text.to_string()).ok();
    }

    /// initializing -> connecting -> idling, with the connecting state
    /// confirming its own connection from its enter hook.
    fn observer() -> StateMachine<Kind, Observer> {
        StateMachine::new(
            [
                State::new("initializing")
                    .transition("started", "connecting")
                    .transition("quit", "stopped"),
                State::new("connecting")
                    .transition("connected", "idling")
                    .transition("quit", "stopped")
                    .on_enter(|scope: &mut Observer, _: &Event<Kind>| {
                        note(scope, "connecting");
                        scope.post(Event::new("connected"));
                        Ok(())
                    }),
                State::new("idling")
                    .transition("quit", "stopped")
                    .handler("track", |scope: &mut Observer, event: &Event<Kind>| {
                        let title = event.value().as_str().unwrap_or_default().to_string();
                        note(scope, &format!("track {title}"));
                        Ok(())
                    })
                    .on_enter(|scope: &mut Observer, _: &Event<Kind>| {
                        note(scope, "idling");
                        Ok(())
                    }),
                State::new("stopped").on_enter(|scope: &mut Observer, _: &Event<Kind>| {
                    note(scope, "stopped");
                    scope.stop();
                    Ok(())
                }),
            ],
            "initializing",
        )
    }

    #[test]
    fn enter_hook_posts_are_processed_in_the_same_run() {
        let registry = Registry::new();
        let (tx, rx) = mpsc::channel();
        let mut task = TaskBuilder::new("observer", &registry).build_with(|ctx| {
            FsmTask::new(ctx, observer(), tx).start_with(Event::new("started"))
        });

        task.start().unwrap();
        let timeout = Duration::from_secs(5);
        assert_eq!(rx.recv_timeout(timeout).unwrap(), "connecting");
        assert_eq!(rx.recv_timeout(timeout).unwrap(), "idling");

        task.post(Event::with_value("track", "Blue Train"));
        task.post(Event::new("quit"));
        task.join(Some(timeout)).unwrap();

        let notes: Vec<String> = rx.try_iter().collect();
        assert_eq!(notes, vec!["track Blue Train", "stopped"]);
    }

    #[test]
    fn dispatch_reports_outcomes() {
        let registry = Registry::new();
        let (tx, _rx) = mpsc::channel();
        let mut fsm = None;
        let _task = TaskBuilder::new("recorder", &registry).build_with(|ctx| {
            fsm = Some(FsmTask::new(ctx.clone(), observer(), tx.clone()));
            FsmTask::new(ctx, observer(), tx)
        });
        let mut fsm = fsm.unwrap();

        let unhandled = fsm.dispatch(&Event::new("track")).unwrap();
        assert_eq!(unhandled, Dispatch::Unhandled);

        let moved = fsm.dispatch(&Event::new("started")).unwrap();
        assert!(moved.is_effective());
        assert_eq!(fsm.current_state(), "connecting");
        assert_eq!(fsm.scope().context().pending(), 1);
    }

    /// Shared buffer the log output is written into.
    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn dispatch_logs_carry_the_outcome_label() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let registry = Registry::new();
        let machine: StateMachine<Kind, Scope<Kind, ()>> =
            StateMachine::new([State::new("lonely").transition("leave", "nowhere")], "lonely");
        let mut fsm = None;
        let _task = TaskBuilder::new("labelled", &registry)
            .build_with(|ctx| {
                fsm = Some(FsmTask::new(ctx.clone(), machine, ()));
                crate::task::HandlerTable::new(ctx, ())
            });
        let mut fsm = fsm.unwrap();

        tracing::subscriber::with_default(subscriber, || {
            fsm.dispatch(&Event::new("leave")).unwrap();
            fsm.dispatch(&Event::new("unknown")).unwrap();
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("broken_transition"), "{output}");
        assert!(output.contains("unhandled"), "{output}");
    }

    #[test]
    fn handler_errors_end_the_task() {
        let registry = Registry::new();
        let machine: StateMachine<Kind, Scope<Kind, ()>> = StateMachine::new(
            [State::new("only").handler("fail", |_: &mut Scope<Kind, ()>, _: &Event<Kind>| {
                Err(HandlerError::msg("adapter unavailable"))
            })],
            "only",
        );
        let mut task = TaskBuilder::new("failing", &registry)
            .build_with(move |ctx| FsmTask::new(ctx, machine, ()));

        task.start().unwrap();
        task.post(Event::new("fail"));

        let err = task.join(Some(Duration::from_secs(5))).unwrap_err();
        assert!(err.is_fatal());
        assert!(registry.is_empty());
    }
}
