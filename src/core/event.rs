//! Events that broadcast a trigger to subscribed states.

use super::ids::{EventId, StateId};

/// A trigger shared by any number of states.
///
/// The event only knows which states subscribed to it. Broadcasting, name
/// matching and the symmetric bookkeeping on the state side live in
/// [`Stage`](crate::stage::Stage), which owns both sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    id: EventId,
    subscribers: Vec<StateId>,
}

impl Event {
    /// An event with no subscribers.
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            subscribers: Vec::new(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    /// Subscribed states in subscription order.
    pub fn subscribers(&self) -> &[StateId] {
        &self.subscribers
    }

    /// Whether triggering would reach nobody.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub(crate) fn set_id(&mut self, id: EventId) {
        self.id = id;
    }

    pub(crate) fn add(&mut self, state: StateId) {
        if !self.subscribers.contains(&state) {
            self.subscribers.push(state);
        }
    }

    pub(crate) fn remove(&mut self, state: StateId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| *s != state);
        self.subscribers.len() != before
    }
}
