//! Menu and Game Loop
//!
//! This example drives two screens through a fixed-step game loop.
//!
//! Key concepts:
//! - Screens as named states with lifecycle hooks
//! - Events mapped to the next screen's name
//! - Transitions applied at the start of the next cycle
//! - A manager owning the drawing surface
//!
//! Run with: cargo run --example menu_loop

use stagehand::core::{EventId, HookResult, Lifecycle, Signals};
use stagehand::manager::ManualClock;
use stagehand::{Stage, StateBuilder};
use std::time::Duration;

const START: EventId = EventId(1);
const QUIT: EventId = EventId(2);

/// Lines drawn during one frame.
type Frame = Vec<String>;

struct Menu;

impl Lifecycle<Frame> for Menu {
    fn init(&mut self) -> HookResult {
        println!("  [menu] loading title art");
        Ok(())
    }

    fn update(&mut self, _elapsed: Duration, _signals: &mut Signals) -> HookResult {
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) -> HookResult {
        frame.push("MENU: press start".to_string());
        Ok(())
    }

    fn clean_up(&mut self) -> HookResult {
        println!("  [menu] releasing title art");
        Ok(())
    }
}

#[derive(Default)]
struct Game {
    played: Duration,
}

impl Lifecycle<Frame> for Game {
    fn init(&mut self) -> HookResult {
        println!("  [game] spawning player");
        self.played = Duration::ZERO;
        Ok(())
    }

    fn update(&mut self, elapsed: Duration, _signals: &mut Signals) -> HookResult {
        self.played += elapsed;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) -> HookResult {
        frame.push(format!("GAME: {} ms played", self.played.as_millis()));
        Ok(())
    }
}

fn main() {
    println!("=== Menu and Game Loop ===\n");

    let mut stage: Stage<Frame> = Stage::new();
    stage.create_event_with_id(START).unwrap();
    stage.create_event_with_id(QUIT).unwrap();

    let menu = stage
        .add(StateBuilder::new().name("Menu").behavior(Menu).on(START, "Game"))
        .unwrap();
    let game = stage
        .add(
            StateBuilder::new()
                .name("Game")
                .behavior(Game::default())
                .on(QUIT, "Menu"),
        )
        .unwrap();
    stage.subscribe(menu, START).unwrap();
    stage.subscribe(game, QUIT).unwrap();

    let clock = ManualClock::new();
    let manager = stage.create_manager_with_clock(Vec::new(), clock.clone());
    stage.register_state(manager, menu).unwrap();
    stage.register_state(manager, game).unwrap();
    stage.set_current_state(manager, menu).unwrap();

    // Scripted input: which event the "player" fires before each frame.
    let script = [None, Some(START), None, None, Some(QUIT), None];

    for (frame, input) in script.iter().enumerate() {
        if let Some(event) = input {
            println!("input: {event}");
            stage.trigger(*event).unwrap();
        }

        clock.advance(Duration::from_millis(16));
        let report = stage.cycle(manager).unwrap();
        if let Some(transition) = &report.transition {
            println!(
                "  switched {} -> {}",
                transition.from.as_deref().unwrap_or("-"),
                transition.to
            );
        }

        let surface = stage.manager_mut(manager).unwrap().surface_mut();
        for line in surface.drain(..) {
            println!("frame {frame}: {line}");
        }
    }

    let history = stage.manager(manager).unwrap().history();
    println!("\nPath taken: {}", history.get_path().join(" -> "));

    println!("\n=== Example Complete ===");
}
