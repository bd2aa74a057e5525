//! Core state machine types.
//!
//! This module contains the building blocks the stage wires together:
//! - `State`: a named screen with a transition table
//! - `Event`: a trigger broadcast to subscribed states
//! - `Lifecycle`: the hooks a screen implements
//! - History tracking of manager transitions

mod event;
mod history;
mod ids;
mod lifecycle;
mod state;

pub use event::Event;
pub use history::{TransitionCause, TransitionHistory, TransitionRecord};
pub use ids::{EventId, ManagerId, StateId};
pub use lifecycle::{Hook, HookError, HookResult, Idle, Lifecycle, Signals};
pub use state::State;
