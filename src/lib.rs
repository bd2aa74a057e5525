//! Stagehand: screen orchestration for game loops
//!
//! Stagehand organizes an application into named states ("screens" such as a
//! menu, gameplay or a pause overlay) and switches between them when events
//! fire. A manager drives the current state once per frame, always in the same
//! order: `events`, then `update`, then `draw`.
//!
//! # Core Concepts
//!
//! - **State**: a named screen with a [`Lifecycle`] behavior and a table
//!   mapping event ids to the next state's name
//! - **Event**: a trigger broadcast to every subscribed state; only the
//!   active one records a transition
//! - **Manager**: keeps one state current, owns the drawing surface and the
//!   clock, and applies pending transitions at the start of a cycle
//! - **Stage**: the arena owning all of the above and keeping their
//!   cross-references consistent
//!
//! # Example
//!
//! ```rust
//! use stagehand::core::{EventId, HookResult, Lifecycle, Signals};
//! use stagehand::{Stage, StateBuilder};
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct Menu;
//!
//! impl Lifecycle<String> for Menu {
//!     fn events(&mut self, signals: &mut Signals) -> HookResult {
//!         // Pretend the player pressed "start".
//!         signals.fire(EventId(1));
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _elapsed: Duration, _signals: &mut Signals) -> HookResult {
//!         Ok(())
//!     }
//!
//!     fn draw(&mut self, frame: &mut String) -> HookResult {
//!         frame.push_str("[menu]");
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Game;
//!
//! impl Lifecycle<String> for Game {
//!     fn update(&mut self, _elapsed: Duration, _signals: &mut Signals) -> HookResult {
//!         Ok(())
//!     }
//!
//!     fn draw(&mut self, frame: &mut String) -> HookResult {
//!         frame.push_str("[game]");
//!         Ok(())
//!     }
//! }
//!
//! let mut stage: Stage<String> = Stage::new();
//! let start = stage.create_event_with_id(EventId(1)).unwrap();
//! let menu = stage
//!     .add(StateBuilder::new().name("Menu").behavior(Menu).on(start, "Game"))
//!     .unwrap();
//! let game = stage.add_state("Game", Game).unwrap();
//! stage.subscribe(menu, start).unwrap();
//!
//! let manager = stage.create_manager(String::new());
//! stage.register_state(manager, menu).unwrap();
//! stage.register_state(manager, game).unwrap();
//! stage.set_current_state(manager, menu).unwrap();
//!
//! stage.cycle(manager).unwrap(); // menu draws and fires `start`
//! let report = stage.cycle(manager).unwrap(); // switch, then game draws
//!
//! assert!(report.transitioned());
//! assert_eq!(stage.current_state(manager), Some(game));
//! assert_eq!(stage.manager(manager).unwrap().surface(), "[menu][game]");
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod manager;
pub mod snapshot;
pub mod stage;

// Re-export commonly used types
pub use builder::{BuildError, StateBuilder};
pub use config::{ConfigError, NamePolicy, StageConfig};
pub use core::{Event, EventId, HookError, HookResult, Lifecycle, ManagerId, Signals, State, StateId};
pub use manager::{CycleReport, Manager};
pub use snapshot::{Snapshot, SnapshotError};
pub use stage::{GraphViolation, Stage, StageError};
