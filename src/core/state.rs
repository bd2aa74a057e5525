//! A named screen and its outgoing transition table.

use super::ids::{EventId, ManagerId};
use super::lifecycle::Lifecycle;
use crate::config::NamePolicy;
use std::collections::BTreeMap;
use std::fmt;

/// One mode of program behavior (menu, gameplay, pause, ...).
///
/// A state couples a [`Lifecycle`] behavior with the bookkeeping the manager
/// needs to drive it:
///
/// - an **active** flag, set while the manager dispatches to it,
/// - a **triggered** flag, set when an event requested a transition,
/// - a table mapping event ids to the name of the next state,
/// - a **default next** state used when an event maps to nothing.
///
/// States live inside a [`Stage`](crate::stage::Stage) and are addressed by
/// [`StateId`](super::StateId). Events and managers refer to them only through
/// that handle.
///
/// # Example
///
/// ```rust
/// use stagehand::core::{EventId, Idle, State};
///
/// let mut menu: State<()> = State::new("Menu", Idle);
/// menu.register_transition(EventId(1), "Game");
///
/// // Inactive states ignore events.
/// assert!(!menu.on_event(EventId(1)));
/// assert_eq!(menu.pending_next_state(), None);
/// ```
pub struct State<D> {
    name: String,
    active: bool,
    triggered: bool,
    next: String,
    default_next: String,
    transitions: BTreeMap<EventId, String>,
    events: Vec<EventId>,
    manager: Option<ManagerId>,
    behavior: Box<dyn Lifecycle<D>>,
}

impl<D> State<D> {
    /// Create an inactive state with an empty transition table.
    pub fn new(name: impl Into<String>, behavior: impl Lifecycle<D> + 'static) -> Self {
        Self::from_boxed(name, Box::new(behavior))
    }

    /// Create an inactive state around an already boxed behavior.
    pub fn from_boxed(name: impl Into<String>, behavior: Box<dyn Lifecycle<D>>) -> Self {
        Self {
            name: name.into(),
            active: false,
            triggered: false,
            next: String::new(),
            default_next: String::new(),
            transitions: BTreeMap::new(),
            events: Vec::new(),
            manager: None,
            behavior,
        }
    }

    /// The name other states use to target this one.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the name if `policy` accepts it. Returns `false` without
    /// touching the state otherwise.
    ///
    /// Crate-private: a rename has to be mirrored in the owning manager's
    /// bookkeeping, so callers go through
    /// [`Stage::rename_state`](crate::stage::Stage::rename_state).
    pub(crate) fn rename(&mut self, name: impl Into<String>, policy: &NamePolicy) -> bool {
        let name = name.into();
        if !policy.accepts(&name) {
            return false;
        }
        self.name = name;
        true
    }

    /// Map `event` to `next`, replacing any previous mapping.
    pub fn register_transition(&mut self, event: EventId, next: impl Into<String>) {
        self.transitions.insert(event, next.into());
    }

    /// Mark `event` as leading nowhere.
    pub fn clear_transition(&mut self, event: EventId) {
        self.transitions.insert(event, String::new());
    }

    /// The next-state name mapped to `event`, if any.
    pub fn transition(&self, event: EventId) -> Option<&str> {
        self.transitions
            .get(&event)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// The whole transition table, including "no transition" entries.
    pub fn transitions(&self) -> &BTreeMap<EventId, String> {
        &self.transitions
    }

    /// Set the fallback target. Empty names are rejected.
    pub fn set_default_next(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.is_empty() {
            return false;
        }
        self.default_next = name;
        true
    }

    /// Remove the fallback target.
    ///
    /// A state triggered only through the fallback has nothing left to switch
    /// to, so its trigger is dropped as well.
    pub fn clear_default_next(&mut self) {
        self.default_next.clear();
        if self.next.is_empty() {
            self.triggered = false;
        }
    }

    /// The fallback target, if one is configured.
    pub fn default_next(&self) -> Option<&str> {
        non_empty(&self.default_next)
    }

    /// React to `event` being triggered.
    ///
    /// Only an active state records a transition. It does so when `event`
    /// maps to a name or, failing that, when a default next state is
    /// configured. Returns whether a transition is now pending.
    pub fn on_event(&mut self, event: EventId) -> bool {
        if !self.active {
            return false;
        }

        let mapped = self.transition(event).map(str::to_owned);
        match mapped {
            Some(next) => self.next = next,
            None if !self.default_next.is_empty() => self.next.clear(),
            None => return false,
        }

        self.triggered = true;
        true
    }

    /// The name the manager should switch to: the triggered name, else the
    /// default, else nothing.
    pub fn pending_next_state(&self) -> Option<&str> {
        non_empty(&self.next).or_else(|| self.default_next())
    }

    /// Whether this state is the current state of its manager.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a transition is waiting for the manager's next cycle.
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Clear the triggered flag and the dynamically triggered name.
    pub fn reset_triggered(&mut self) {
        self.triggered = false;
        self.next.clear();
    }

    /// Events this state is subscribed to.
    pub fn events(&self) -> &[EventId] {
        &self.events
    }

    /// The manager this state is registered with.
    pub fn manager(&self) -> Option<ManagerId> {
        self.manager
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_manager(&mut self, manager: Option<ManagerId>) {
        self.manager = manager;
    }

    pub(crate) fn add_event(&mut self, event: EventId) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    pub(crate) fn remove_event(&mut self, event: EventId) {
        self.events.retain(|e| *e != event);
    }

    pub(crate) fn replace_event(&mut self, old: EventId, new: EventId) {
        for e in self.events.iter_mut().filter(|e| **e == old) {
            *e = new;
        }
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut dyn Lifecycle<D> {
        self.behavior.as_mut()
    }

    pub(crate) fn into_behavior(self) -> Box<dyn Lifecycle<D>> {
        self.behavior
    }
}

impl<D> fmt::Debug for State<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("active", &self.active)
            .field("triggered", &self.triggered)
            .field("next", &self.next)
            .field("default_next", &self.default_next)
            .field("transitions", &self.transitions)
            .field("events", &self.events)
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
