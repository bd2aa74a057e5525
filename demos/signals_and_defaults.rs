//! Signals and Default Targets
//!
//! This example shows screens that move on by themselves.
//!
//! Key concepts:
//! - Hooks firing events through `Signals`
//! - A default next state used when an event has no mapping
//! - Graph validation before the loop starts
//! - A diagnostic snapshot at the end
//!
//! Run with: cargo run --example signals_and_defaults

use stagehand::core::{EventId, HookResult, Lifecycle, Signals};
use stagehand::{Stage, StateBuilder};
use std::time::Duration;

/// Fires `event` once its timer runs out.
struct Timed {
    label: &'static str,
    remaining: u32,
    event: EventId,
}

impl Lifecycle<Vec<String>> for Timed {
    fn update(&mut self, _elapsed: Duration, signals: &mut Signals) -> HookResult {
        if self.remaining == 0 {
            signals.fire(self.event);
        } else {
            self.remaining -= 1;
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Vec<String>) -> HookResult {
        frame.push(format!("{} ({} left)", self.label, self.remaining));
        Ok(())
    }
}

fn main() {
    println!("=== Signals and Default Targets ===\n");

    let mut stage: Stage<Vec<String>> = Stage::new();
    let any_key = stage.create_event();
    let timeout = stage.create_event();

    // Splash has no mapping at all: any event it hears leads to its default.
    let splash = stage
        .add(
            StateBuilder::new()
                .name("Splash")
                .behavior(Timed {
                    label: "splash",
                    remaining: 2,
                    event: any_key,
                })
                .default_next("Menu"),
        )
        .unwrap();
    let menu = stage
        .add(
            StateBuilder::new()
                .name("Menu")
                .behavior(Timed {
                    label: "menu",
                    remaining: 1,
                    event: timeout,
                })
                .on(timeout, "Attract"),
        )
        .unwrap();
    let attract = stage.add_state("Attract", stagehand::core::Idle).unwrap();

    stage.subscribe(splash, any_key).unwrap();
    stage.subscribe(menu, timeout).unwrap();

    let manager = stage.create_manager(Vec::new());
    for state in [splash, menu, attract] {
        stage.register_state(manager, state).unwrap();
    }

    let check = stage.validate(manager).unwrap();
    println!("Transition graph valid: {}\n", check.is_success());

    stage.set_current_state(manager, splash).unwrap();
    for cycle in 1..=8 {
        let report = stage.cycle(manager).unwrap();
        if let Some(transition) = &report.transition {
            println!("cycle {cycle}: now showing {}", transition.to);
        }
        let surface = stage.manager_mut(manager).unwrap().surface_mut();
        for line in surface.drain(..) {
            println!("cycle {cycle}: {line}");
        }
    }

    let snapshot = stage.snapshot(manager).unwrap();
    println!("\nSnapshot:\n{}", snapshot.to_json().unwrap());

    println!("\n=== Example Complete ===");
}
