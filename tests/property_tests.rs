//! Property-based tests for the state machine and task queue.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use taskfsm::core::StateHistory;
use taskfsm::{Dispatch, Event, HandlerTable, Registry, Scope, State, StateMachine, TaskBuilder};

type Kind = &'static str;
type Collected = Scope<Kind, Vec<i64>>;
type Reported = Scope<Kind, std::sync::mpsc::Sender<Vec<i64>>>;

const STATES: [&str; 4] = ["a", "b", "c", "d"];
const KINDS: [&str; 4] = ["w", "x", "y", "z"];

/// What a state does with one event kind.
#[derive(Clone, Debug)]
enum Reaction {
    Goto(usize),
    Handle,
    Ignore,
}

fn arbitrary_reaction() -> impl Strategy<Value = Reaction> {
    prop_oneof![
        (0..STATES.len()).prop_map(Reaction::Goto),
        Just(Reaction::Handle),
        Just(Reaction::Ignore),
    ]
}

prop_compose! {
    fn arbitrary_table()(
        cells in prop::collection::vec(arbitrary_reaction(), STATES.len() * KINDS.len())
    ) -> Vec<Vec<Reaction>> {
        cells.chunks(KINDS.len()).map(|row| row.to_vec()).collect()
    }
}

/// Count of handler calls per (state, kind).
type Calls = HashMap<(&'static str, &'static str), usize>;

fn build(table: &[Vec<Reaction>]) -> StateMachine<&'static str, Calls> {
    let states = table.iter().enumerate().map(|(s, row)| {
        let name = STATES[s];
        row.iter()
            .enumerate()
            .fold(State::new(name), |state, (k, reaction)| {
                let kind = KINDS[k];
                match reaction {
                    Reaction::Goto(target) => state.transition(kind, STATES[*target]),
                    Reaction::Handle => state.handler(kind, move |calls: &mut Calls, _| {
                        *calls.entry((name, kind)).or_default() += 1;
                        Ok(())
                    }),
                    Reaction::Ignore => state,
                }
            })
    });
    StateMachine::new(states, STATES[0])
}

proptest! {
    #[test]
    fn dispatch_follows_the_table(
        table in arbitrary_table(),
        events in prop::collection::vec(0..KINDS.len(), 0..40),
    ) {
        let mut machine = build(&table);
        let mut calls = Calls::new();
        let mut current = 0usize;

        for k in events {
            let outcome = machine.handle_event(&mut calls, &Event::new(KINDS[k])).unwrap();
            match &table[current][k] {
                Reaction::Goto(target) => {
                    prop_assert_eq!(
                        outcome,
                        Dispatch::Transitioned {
                            from: STATES[current].to_string(),
                            to: STATES[*target].to_string(),
                        }
                    );
                    current = *target;
                }
                Reaction::Handle => prop_assert_eq!(outcome, Dispatch::Handled),
                Reaction::Ignore => prop_assert_eq!(outcome, Dispatch::Unhandled),
            }
            prop_assert_eq!(machine.current_state(), STATES[current]);
        }
    }

    #[test]
    fn handlers_never_change_state(
        table in arbitrary_table(),
        events in prop::collection::vec(0..KINDS.len(), 0..40),
    ) {
        let mut machine = build(&table);
        let mut calls = Calls::new();

        for k in events {
            let before = machine.current_state().to_string();
            let outcome = machine.handle_event(&mut calls, &Event::new(KINDS[k])).unwrap();
            if !matches!(outcome, Dispatch::Transitioned { .. }) {
                prop_assert_eq!(machine.current_state(), before.as_str());
            }
        }
    }

    #[test]
    fn history_never_exceeds_limit(
        limit in 0usize..8,
        hops in 0usize..30,
    ) {
        let mut history = StateHistory::with_limit(limit);
        for i in 0..hops {
            history.record(taskfsm::core::StateTransition {
                from: format!("s{i}"),
                to: format!("s{}", i + 1),
                trigger: "next".to_string(),
                timestamp: chrono::Utc::now(),
            });
        }
        prop_assert!(history.transitions().len() <= limit);
        prop_assert_eq!(history.transitions().len(), hops.min(limit));
    }

    #[test]
    fn queue_preserves_post_order(values in prop::collection::vec(any::<i64>(), 0..50)) {
        let registry = Registry::new();
        let mut task = TaskBuilder::new("fifo", &registry)
            .threaded(false)
            .build_with(|ctx| {
                HandlerTable::new(ctx, Vec::new())
                    .on("value", |scope: &mut Collected, event: &Event<Kind>| {
                        scope.data.push(event.value().as_i64().unwrap_or_default());
                        Ok(())
                    })
                    .on("quit", |scope: &mut Collected, _: &Event<Kind>| {
                        let received = std::mem::take(&mut scope.data);
                        scope.emit(Event::with_value("report", received));
                        scope.stop();
                        Ok(())
                    })
            });

        let (tx, rx) = std::sync::mpsc::channel();
        let mut listener = TaskBuilder::new("listener", &registry).build_with(move |ctx| {
            HandlerTable::new(ctx, tx).on("report", |scope: &mut Reported, event: &Event<Kind>| {
                let values = serde_json::from_value(event.value().clone()).unwrap_or_default();
                scope.data.send(values).ok();
                scope.stop();
                Ok(())
            })
        });
        listener.start().unwrap();
        while !registry.contains(listener.id()) {
            std::thread::yield_now();
        }

        for value in &values {
            task.post(Event::with_value("value", *value));
        }
        task.post(Event::new("quit"));
        task.start().unwrap();

        let received = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        listener.join(Some(Duration::from_secs(5))).unwrap();
        prop_assert_eq!(received, values);
    }
}
