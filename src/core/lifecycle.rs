//! Lifecycle hooks implemented by concrete screens.

use super::ids::EventId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a lifecycle hook.
///
/// The manager never reacts to a failed hook beyond logging it and listing it
/// in the [`CycleReport`](crate::manager::CycleReport).
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("hook failed with status {code}: {message}")]
pub struct HookError {
    pub code: i32,
    pub message: String,
}

impl HookError {
    /// A failure with a non-zero status `code`.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result of a lifecycle hook. `Ok(())` is status 0.
pub type HookResult = Result<(), HookError>;

/// Names the hook a failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hook {
    Init,
    Events,
    Update,
    Draw,
    CleanUp,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Events => "events",
            Self::Update => "update",
            Self::Draw => "draw",
            Self::CleanUp => "clean_up",
        };
        f.write_str(s)
    }
}

/// Events fired from inside a hook.
///
/// Hooks cannot reach the stage while it is dispatching to them, so they
/// queue event ids here. The stage triggers them once the dispatch phase of
/// the cycle has finished; the resulting transition is taken on the next
/// cycle.
#[derive(Debug, Default)]
pub struct Signals {
    queued: Vec<EventId>,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` for triggering after this cycle's dispatch.
    pub fn fire(&mut self, event: EventId) {
        self.queued.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, EventId> {
        self.queued.drain(..)
    }
}

/// Behavior of one screen, driven by its manager.
///
/// `D` is the drawing surface owned by the manager. Hooks are only ever called
/// by the manager: `init` on activation, then `events`, `update` and `draw`
/// once per cycle while active, and `clean_up` on deactivation.
///
/// # Example
///
/// ```rust
/// use stagehand::core::{HookResult, Lifecycle, Signals};
/// use std::time::Duration;
///
/// struct Menu {
///     frames: u32,
/// }
///
/// impl Lifecycle<Vec<String>> for Menu {
///     fn update(&mut self, _elapsed: Duration, _signals: &mut Signals) -> HookResult {
///         self.frames += 1;
///         Ok(())
///     }
///
///     fn draw(&mut self, surface: &mut Vec<String>) -> HookResult {
///         surface.push(format!("menu frame {}", self.frames));
///         Ok(())
///     }
/// }
/// ```
pub trait Lifecycle<D> {
    /// Entry hook, called when the state becomes current.
    fn init(&mut self) -> HookResult {
        Ok(())
    }

    /// Input and event sampling. Runs first in every cycle.
    fn events(&mut self, _signals: &mut Signals) -> HookResult {
        Ok(())
    }

    /// Simulation step with the time elapsed since the previous cycle.
    fn update(&mut self, elapsed: Duration, signals: &mut Signals) -> HookResult;

    /// Rendering onto the manager's shared surface.
    fn draw(&mut self, surface: &mut D) -> HookResult;

    /// Exit hook, called when the state stops being current.
    fn clean_up(&mut self) -> HookResult {
        Ok(())
    }
}

/// A behavior that does nothing. Useful for placeholder screens.
#[derive(Debug, Default, Clone, Copy)]
pub struct Idle;

impl<D> Lifecycle<D> for Idle {
    fn update(&mut self, _elapsed: Duration, _signals: &mut Signals) -> HookResult {
        Ok(())
    }

    fn draw(&mut self, _surface: &mut D) -> HookResult {
        Ok(())
    }
}
