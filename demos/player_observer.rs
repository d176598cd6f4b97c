//! Player Observer
//!
//! This demo wires a fake music-player adapter to an application task.
//!
//! Key concepts:
//! - An FsmTask whose enter hook confirms its own connection
//! - Broadcasting track changes to every other running task
//! - A composite task that starts its child in `run_pre` and joins it in `run_post`
//! - Shutting everything down with one emitted `quit`
//!
//! Run with: cargo run --example player_observer
//! (set RUST_LOG=debug to see the runtime's own logs)

use std::sync::Arc;
use std::time::Duration;
use taskfsm::{
    event_kind, Behavior, Context, Event, FsmTask, HandlerError, HandlerResult, Registry, Scope,
    State, StateMachineBuilder, Task, TaskBuilder,
};

event_kind! {
    enum PlayerEvent {
        Started => "started",
        Connected => "connected",
        Track => "player.track",
        Quit => "quit",
    }
}

type Player = Scope<PlayerEvent, Vec<&'static str>>;

const PLAYLIST: [&str; 3] = ["So What", "Freddie Freeloader", "Blue in Green"];

fn player(registry: &Arc<Registry<PlayerEvent>>) -> Result<Task<PlayerEvent>, HandlerError> {
    let machine = StateMachineBuilder::new()
        .initial("initializing")
        .state(
            State::new("initializing")
                .transition(PlayerEvent::Started, "connecting")
                .transition(PlayerEvent::Quit, "stopped"),
        )
        .state(
            State::new("connecting")
                .transition(PlayerEvent::Connected, "idling")
                .transition(PlayerEvent::Quit, "stopped")
                .on_enter(|player: &mut Player, _event| {
                    println!("  player: connecting");
                    player.post(Event::new(PlayerEvent::Connected));
                    Ok(())
                }),
        )
        .state(
            State::new("idling")
                .transition(PlayerEvent::Quit, "stopped")
                .on_enter(|player: &mut Player, _event| {
                    println!("  player: connected, announcing playlist");
                    for title in player.data.iter().copied() {
                        player.emit(Event::with_value(PlayerEvent::Track, title));
                    }
                    Ok(())
                }),
        )
        .state(State::new("stopped").on_enter(|player: &mut Player, _event| {
            println!("  player: stopped");
            player.stop();
            Ok(())
        }))
        .build()
        .map_err(HandlerError::source)?;

    Ok(TaskBuilder::new("player", registry).build_with(|ctx| {
        FsmTask::new(ctx, machine, PLAYLIST.to_vec()).start_with(Event::new(PlayerEvent::Started))
    }))
}

/// Application task: owns the player and quits after the whole playlist.
struct App {
    player: Task<PlayerEvent>,
    heard: Vec<String>,
}

impl Behavior<PlayerEvent> for App {
    fn run_pre(&mut self, _ctx: &Context<PlayerEvent>) -> HandlerResult {
        self.player.start().map_err(HandlerError::source)
    }

    fn run_post(&mut self, _ctx: &Context<PlayerEvent>) -> HandlerResult {
        self.player
            .join(Some(Duration::from_secs(5)))
            .map_err(HandlerError::source)
    }

    fn process_event(
        &mut self,
        ctx: &Context<PlayerEvent>,
        event: Event<PlayerEvent>,
    ) -> HandlerResult {
        if *event.kind() == PlayerEvent::Track {
            let title = event.value().as_str().unwrap_or("?").to_string();
            println!("  app: now playing '{title}'");
            self.heard.push(title);
            if self.heard.len() == PLAYLIST.len() {
                println!("  app: playlist finished, quitting");
                ctx.emit(Event::new(PlayerEvent::Quit));
                ctx.stop();
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Player Observer ===\n");

    let registry = Registry::new();
    let player = player(&registry)?;
    let mut app = TaskBuilder::new("app", &registry).build(App {
        player,
        heard: Vec::new(),
    });

    app.start()?;
    app.join(Some(Duration::from_secs(10)))?;

    println!("\nRunning tasks left: {}", registry.len());
    println!("\n=== Demo Complete ===");
    Ok(())
}
