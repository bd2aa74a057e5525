//! Stage errors.

use crate::builder::BuildError;
use crate::core::{EventId, ManagerId, StateId};
use thiserror::Error;

/// Errors returned by [`Stage`](super::Stage) operations.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Unknown state handle {0}")]
    UnknownState(StateId),

    #[error("Unknown event {0}")]
    UnknownEvent(EventId),

    #[error("Unknown manager handle {0}")]
    UnknownManager(ManagerId),

    #[error("Invalid state name {name:?}: names need at least {min_len} character(s)")]
    InvalidName { name: String, min_len: usize },

    #[error("State name {name:?} is already registered with {manager}")]
    NameTaken { name: String, manager: ManagerId },

    #[error("Event {event} already has a subscriber named {name:?}")]
    SubscriberNameTaken { name: String, event: EventId },

    #[error("Event {0} already exists")]
    DuplicateEvent(EventId),

    #[error("{state} is not registered with {manager}")]
    NotRegistered { state: StateId, manager: ManagerId },

    #[error(transparent)]
    Build(#[from] BuildError),
}
