//! What happened during one cycle.

use crate::core::{EventId, Hook, HookError, TransitionRecord};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A hook that returned an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HookFailure {
    pub state: String,
    pub hook: Hook,
    pub error: HookError,
}

/// Outcome of [`Stage::cycle`](crate::stage::Stage::cycle).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Time since the previous cycle.
    pub elapsed: Duration,
    /// Transition applied in this cycle, if any.
    pub transition: Option<TransitionRecord>,
    /// Whether `events`, `update` and `draw` ran.
    pub dispatched: bool,
    /// Target that could not be resolved to a registered state.
    pub unresolved: Option<String>,
    pub failures: Vec<HookFailure>,
    /// Events signalled by hooks that no longer exist.
    pub dropped_signals: Vec<EventId>,
}

impl CycleReport {
    pub(crate) fn new(cycle: u64, elapsed: Duration) -> Self {
        Self {
            cycle,
            elapsed,
            transition: None,
            dispatched: false,
            unresolved: None,
            failures: Vec::new(),
            dropped_signals: Vec::new(),
        }
    }

    /// Whether this cycle switched states.
    pub fn transitioned(&self) -> bool {
        self.transition.is_some()
    }

    /// Whether the cycle ran without anything logged as a warning.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.dropped_signals.is_empty() && self.unresolved.is_none()
    }
}
