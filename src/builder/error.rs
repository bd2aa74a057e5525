//! Build errors for the state builder.

use crate::core::EventId;
use thiserror::Error;

/// Errors that can occur when building a state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("State name not specified. Call .name(name) before .build()")]
    MissingName,

    #[error("State behavior not specified. Call .behavior(hooks) before .build()")]
    MissingBehavior,

    #[error("Transition for {event} has an empty target. Use .no_transition(event) instead")]
    EmptyTarget { event: EventId },

    #[error("Default next state must not be empty")]
    EmptyDefault,
}
