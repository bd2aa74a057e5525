//! Builder for constructing states.

use crate::builder::error::BuildError;
use crate::core::{EventId, Lifecycle, State};

/// Builder for constructing states with a fluent API.
pub struct StateBuilder<D> {
    name: Option<String>,
    behavior: Option<Box<dyn Lifecycle<D>>>,
    transitions: Vec<(EventId, Option<String>)>,
    default_next: Option<String>,
}

impl<D> StateBuilder<D> {
    /// Create a new state builder.
    pub fn new() -> Self {
        Self {
            name: None,
            behavior: None,
            transitions: Vec::new(),
            default_next: None,
        }
    }

    /// Set the state name (required).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the lifecycle hooks (required).
    pub fn behavior(mut self, behavior: impl Lifecycle<D> + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Map `event` to the state named `next`.
    pub fn on(mut self, event: EventId, next: impl Into<String>) -> Self {
        self.transitions.push((event, Some(next.into())));
        self
    }

    /// Record `event` as explicitly leading nowhere.
    pub fn no_transition(mut self, event: EventId) -> Self {
        self.transitions.push((event, None));
        self
    }

    /// Fallback target for subscribed events without a mapping (optional).
    pub fn default_next(mut self, next: impl Into<String>) -> Self {
        self.default_next = Some(next.into());
        self
    }

    /// Build the state.
    ///
    /// Name length is checked against the stage's policy when the state is
    /// inserted, not here.
    pub fn build(self) -> Result<State<D>, BuildError> {
        let name = self.name.ok_or(BuildError::MissingName)?;
        let behavior = self.behavior.ok_or(BuildError::MissingBehavior)?;

        let mut state = State::from_boxed(name, behavior);
        for (event, next) in self.transitions {
            match next {
                Some(next) if next.is_empty() => return Err(BuildError::EmptyTarget { event }),
                Some(next) => state.register_transition(event, next),
                None => state.clear_transition(event),
            }
        }
        if let Some(default_next) = self.default_next {
            if !state.set_default_next(default_next) {
                return Err(BuildError::EmptyDefault);
            }
        }

        Ok(state)
    }
}

impl<D> Default for StateBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Idle;

    #[test]
    fn builder_validates_required_fields() {
        let result = StateBuilder::<()>::new().behavior(Idle).build();
        assert!(matches!(result, Err(BuildError::MissingName)));

        let result = StateBuilder::<()>::new().name("Menu").build();
        assert!(matches!(result, Err(BuildError::MissingBehavior)));
    }

    #[test]
    fn builder_rejects_empty_target() {
        let result = StateBuilder::<()>::new()
            .name("Menu")
            .behavior(Idle)
            .on(EventId(4), "")
            .build();
        assert!(matches!(
            result,
            Err(BuildError::EmptyTarget { event: EventId(4) })
        ));
    }

    #[test]
    fn builder_rejects_empty_default() {
        let result = StateBuilder::<()>::new()
            .name("Splash")
            .behavior(Idle)
            .default_next("")
            .build();
        assert!(matches!(result, Err(BuildError::EmptyDefault)));
    }

    #[test]
    fn fluent_api_builds_state() {
        let state = StateBuilder::<()>::new()
            .name("Menu")
            .behavior(Idle)
            .on(EventId(1), "Game")
            .on(EventId(2), "Options")
            .no_transition(EventId(3))
            .default_next("Credits")
            .build()
            .unwrap();

        assert_eq!(state.name(), "Menu");
        assert_eq!(state.transition(EventId(1)), Some("Game"));
        assert_eq!(state.transition(EventId(2)), Some("Options"));
        assert_eq!(state.transition(EventId(3)), None);
        assert_eq!(state.transitions().len(), 3);
        assert_eq!(state.default_next(), Some("Credits"));
        assert!(!state.is_active());
    }

    #[test]
    fn later_mapping_wins() {
        let state = StateBuilder::<()>::new()
            .name("Menu")
            .behavior(Idle)
            .on(EventId(1), "Game")
            .on(EventId(1), "Tutorial")
            .build()
            .unwrap();

        assert_eq!(state.transition(EventId(1)), Some("Tutorial"));
    }
}
