//! The per-frame driver of a set of states.
//!
//! A [`Manager`] keeps the single-current-state invariant for the states
//! registered with it and runs one cycle at a time:
//!
//! 1. sample the elapsed time from its clock,
//! 2. retire the current state if it was triggered (`clean_up`),
//! 3. activate the pending target (`init`),
//! 4. dispatch `events`, `update` and `draw` to the current state.
//!
//! Steps 2 and 3 happen in the same cycle, so a due transition never leaves a
//! frame without a current state.
//!
//! Managers are owned by a [`Stage`](crate::stage::Stage), which hands them
//! the state storage for every operation.

mod clock;
mod report;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use report::{CycleReport, HookFailure};

use crate::config::StageConfig;
use crate::core::{
    Hook, HookResult, ManagerId, Signals, StateId, TransitionCause, TransitionHistory,
    TransitionRecord,
};
use crate::stage::StateMap;
use chrono::Utc;
use std::fmt;
use tracing::{debug, info, warn};

/// Bookkeeping for one group of states sharing a surface and a clock.
pub struct Manager<D> {
    id: ManagerId,
    states: Vec<StateId>,
    current: Option<String>,
    next: Option<String>,
    previous: Option<String>,
    surface: D,
    clock: Box<dyn Clock>,
    cycles: u64,
    history: TransitionHistory,
    record_history: bool,
    history_limit: Option<usize>,
}

impl<D> Manager<D> {
    pub(crate) fn new(
        id: ManagerId,
        surface: D,
        clock: Box<dyn Clock>,
        config: &StageConfig,
    ) -> Self {
        Self {
            id,
            states: Vec::new(),
            current: None,
            next: None,
            previous: None,
            surface,
            clock,
            cycles: 0,
            history: TransitionHistory::new(),
            record_history: config.record_history,
            history_limit: config.history_limit,
        }
    }

    /// Handle of this manager in its stage.
    pub fn id(&self) -> ManagerId {
        self.id
    }

    /// States registered with this manager.
    pub fn registered(&self) -> &[StateId] {
        &self.states
    }

    /// Name of the current state.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Target waiting to be activated, if any.
    pub fn next_name(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Name of the state that was current before this one.
    pub fn previous_name(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// The drawing surface handed to `draw` hooks.
    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    /// Number of cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Transitions taken so far, oldest first.
    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    pub(crate) fn into_surface(self) -> D {
        self.surface
    }

    pub(crate) fn contains(&self, state: StateId) -> bool {
        self.states.contains(&state)
    }

    pub(crate) fn add(&mut self, state: StateId) {
        if !self.contains(state) {
            self.states.push(state);
        }
    }

    pub(crate) fn remove(&mut self, state: StateId) {
        self.states.retain(|s| *s != state);
    }

    /// Registered state called `name`.
    pub(crate) fn find(&self, states: &StateMap<D>, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .copied()
            .find(|id| states.get(id).is_some_and(|s| s.name() == name))
    }

    pub(crate) fn current_id(&self, states: &StateMap<D>) -> Option<StateId> {
        let name = self.current.as_deref()?;
        self.find(states, name)
    }

    pub(crate) fn rename_refs(&mut self, old: &str, new: &str) {
        for slot in [&mut self.current, &mut self.next, &mut self.previous] {
            if slot.as_deref() == Some(old) {
                *slot = Some(new.to_string());
            }
        }
    }

    /// Make `state` current, retiring the existing current state first.
    pub(crate) fn set_current(&mut self, states: &mut StateMap<D>, state: StateId) -> Vec<HookFailure> {
        let mut failures = Vec::new();

        if let Some(current) = self.current_id(states) {
            self.deactivate(states, current, &mut failures);
            self.previous = self.current.take();
        }

        self.next = None;
        if let Some(name) = self.activate(states, state, &mut failures) {
            info!(manager = %self.id, state = %name, "forced state change");
            self.record(self.previous.clone(), name.clone(), TransitionCause::Forced);
            self.current = Some(name);
        }

        failures
    }

    /// Retire the current state without choosing a replacement.
    pub(crate) fn halt(&mut self, states: &mut StateMap<D>) -> Vec<HookFailure> {
        let mut failures = Vec::new();
        if let Some(current) = self.current_id(states) {
            self.deactivate(states, current, &mut failures);
            info!(manager = %self.id, state = ?self.current, "halted");
            self.previous = self.current.take();
        }
        self.current = None;
        self.next = None;
        failures
    }

    /// Run one cycle. Returns the report and the events hooks signalled,
    /// which the stage triggers afterwards.
    pub(crate) fn cycle(&mut self, states: &mut StateMap<D>) -> (CycleReport, Signals) {
        let elapsed = self.clock.restart();
        self.cycles += 1;
        let mut report = CycleReport::new(self.cycles, elapsed);
        let mut signals = Signals::new();

        // First phase: retire a triggered current state.
        if let Some(current) = self.current_id(states) {
            let pending = states
                .get(&current)
                .filter(|s| s.is_triggered())
                .and_then(|s| s.pending_next_state())
                .map(str::to_owned);

            if let Some(next) = pending {
                self.deactivate(states, current, &mut report.failures);
                self.previous = self.current.take();
                self.next = Some(next);
            }
        }

        // Second phase: activate the pending target.
        if self.current.is_none() {
            if let Some(next) = self.next.clone() {
                match self.find(states, &next) {
                    Some(target) => {
                        if let Some(name) = self.activate(states, target, &mut report.failures) {
                            info!(
                                manager = %self.id,
                                from = ?self.previous,
                                to = %name,
                                cycle = self.cycles,
                                "state transition"
                            );
                            self.next = None;
                            self.current = Some(name.clone());
                            report.transition = Some(self.record(
                                self.previous.clone(),
                                name,
                                TransitionCause::Triggered,
                            ));
                        }
                    }
                    None => {
                        warn!(manager = %self.id, target = %next, "transition target is not registered");
                        report.unresolved = Some(next);
                    }
                }
            }
        }

        if let Some(current) = self.current_id(states) {
            if let Some(state) = states.get_mut(&current).filter(|s| s.is_active()) {
                let name = state.name().to_owned();
                let behavior = state.behavior_mut();
                let result = behavior.events(&mut signals);
                note(&mut report.failures, &name, Hook::Events, result);
                let result = behavior.update(elapsed, &mut signals);
                note(&mut report.failures, &name, Hook::Update, result);
                let result = behavior.draw(&mut self.surface);
                note(&mut report.failures, &name, Hook::Draw, result);
                report.dispatched = true;
            }
        }

        (report, signals)
    }

    /// Deactivate `state` and run its exit hook.
    pub(crate) fn deactivate(
        &self,
        states: &mut StateMap<D>,
        state: StateId,
        failures: &mut Vec<HookFailure>,
    ) {
        let Some(state) = states.get_mut(&state) else {
            return;
        };
        debug!(manager = %self.id, state = %state.name(), "deactivating");
        state.set_active(false);
        state.reset_triggered();
        let name = state.name().to_owned();
        let result = state.behavior_mut().clean_up();
        note(failures, &name, Hook::CleanUp, result);
    }

    fn activate(
        &self,
        states: &mut StateMap<D>,
        state: StateId,
        failures: &mut Vec<HookFailure>,
    ) -> Option<String> {
        let state = states.get_mut(&state)?;
        debug!(manager = %self.id, state = %state.name(), "activating");
        state.set_active(true);
        let name = state.name().to_owned();
        let result = state.behavior_mut().init();
        note(failures, &name, Hook::Init, result);
        Some(name)
    }

    fn record(&mut self, from: Option<String>, to: String, cause: TransitionCause) -> TransitionRecord {
        let record = TransitionRecord {
            from,
            to,
            cause,
            cycle: self.cycles,
            timestamp: Utc::now(),
        };
        if self.record_history {
            self.history = self.history.record(record.clone());
            if let Some(limit) = self.history_limit {
                if self.history.len() > limit {
                    self.history = self.history.truncated(limit);
                }
            }
        }
        record
    }
}

impl<D> fmt::Debug for Manager<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("id", &self.id)
            .field("states", &self.states)
            .field("current", &self.current)
            .field("next", &self.next)
            .field("previous", &self.previous)
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}

fn note(failures: &mut Vec<HookFailure>, state: &str, hook: Hook, result: HookResult) {
    if let Err(error) = result {
        warn!(state = %state, hook = %hook, code = error.code, error = %error.message, "lifecycle hook failed");
        failures.push(HookFailure {
            state: state.to_string(),
            hook,
            error,
        });
    }
}
