//! Static checks over a manager's transition graph.
//!
//! A transition whose target is not registered with the manager is silently
//! ignored at run time. These checks find such problems up front and report
//! ALL of them at once through stillwater's `Validation`.

use super::{Stage, StageError};
use crate::core::{EventId, ManagerId};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A problem in a manager's transition graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphViolation {
    #[error("State {state:?} maps {event} to {target:?}, which is not registered")]
    UnknownTarget {
        state: String,
        event: EventId,
        target: String,
    },

    #[error("State {state:?} falls back to {target:?}, which is not registered")]
    UnknownDefault { state: String, target: String },

    #[error("State {state:?} maps {event} but is not subscribed to it")]
    UnsubscribedTransition { state: String, event: EventId },

    #[error("Pending target {target:?} is not registered")]
    UnresolvedNext { target: String },
}

type Check = Validation<(), NonEmptyVec<GraphViolation>>;

impl<D> Stage<D> {
    /// Check every state registered with `manager`, accumulating all
    /// violations.
    pub fn validate(&self, manager: ManagerId) -> Result<Check, StageError> {
        let entry = self
            .managers
            .get(&manager)
            .ok_or(StageError::UnknownManager(manager))?;

        let resolves = |name: &str| entry.find(&self.states, name).is_some();
        let mut checks: Vec<Check> = Vec::new();

        for id in entry.registered() {
            let Some(state) = self.states.get(id) else {
                continue;
            };

            for (event, target) in state.transitions() {
                if target.is_empty() {
                    continue;
                }
                if !resolves(target) {
                    checks.push(Validation::fail(GraphViolation::UnknownTarget {
                        state: state.name().to_string(),
                        event: *event,
                        target: target.clone(),
                    }));
                }
                if !state.events().contains(event) {
                    checks.push(Validation::fail(GraphViolation::UnsubscribedTransition {
                        state: state.name().to_string(),
                        event: *event,
                    }));
                }
            }

            if let Some(target) = state.default_next() {
                if !resolves(target) {
                    checks.push(Validation::fail(GraphViolation::UnknownDefault {
                        state: state.name().to_string(),
                        target: target.to_string(),
                    }));
                }
            }
        }

        if let Some(target) = entry.next_name() {
            if !resolves(target) {
                checks.push(Validation::fail(GraphViolation::UnresolvedNext {
                    target: target.to_string(),
                }));
            }
        }

        checks.push(Validation::success(()));
        Ok(Validation::all_vec(checks).map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Idle;

    #[test]
    fn consistent_graph_passes() {
        let mut stage: Stage<()> = Stage::new();
        let menu = stage.add_state("Menu", Idle).unwrap();
        let game = stage.add_state("Game", Idle).unwrap();
        let start = stage.create_event();
        stage.state_mut(menu).unwrap().register_transition(start, "Game");
        stage.subscribe(menu, start).unwrap();

        let manager = stage.create_manager(());
        stage.register_state(manager, menu).unwrap();
        stage.register_state(manager, game).unwrap();

        assert!(stage.validate(manager).unwrap().is_success());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let mut stage: Stage<()> = Stage::new();
        let menu = stage.add_state("Menu", Idle).unwrap();
        let start = stage.create_event();
        {
            let state = stage.state_mut(menu).unwrap();
            state.register_transition(start, "Game");
            state.set_default_next("Credits");
        }

        let manager = stage.create_manager(());
        stage.register_state(manager, menu).unwrap();

        match stage.validate(manager).unwrap() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, GraphViolation::UnknownTarget { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, GraphViolation::UnknownDefault { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, GraphViolation::UnsubscribedTransition { .. })));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn cleared_transitions_are_not_checked() {
        let mut stage: Stage<()> = Stage::new();
        let menu = stage.add_state("Menu", Idle).unwrap();
        stage.state_mut(menu).unwrap().clear_transition(EventId(3));

        let manager = stage.create_manager(());
        stage.register_state(manager, menu).unwrap();

        assert!(stage.validate(manager).unwrap().is_success());
    }

    #[test]
    fn unknown_manager_is_an_error() {
        let stage: Stage<()> = Stage::new();
        assert!(matches!(
            stage.validate(ManagerId(3)),
            Err(StageError::UnknownManager(_))
        ));
    }
}
