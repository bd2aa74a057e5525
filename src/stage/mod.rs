//! The arena that owns states, events and managers.
//!
//! Every cross-reference (state → events, event → states, state → manager,
//! manager → states) is a handle into this arena. Destroying an object is a
//! removal here that also prunes the handles pointing at it, so nothing is
//! ever left dangling.

mod error;
mod validate;

pub use error::StageError;
pub use validate::GraphViolation;

use crate::builder::StateBuilder;
use crate::config::{ConfigError, StageConfig};
use crate::core::{Event, EventId, Lifecycle, ManagerId, State, StateId};
use crate::manager::{Clock, CycleReport, HookFailure, Manager, MonotonicClock};
use crate::snapshot::Snapshot;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

pub(crate) type StateMap<D> = HashMap<StateId, State<D>>;

/// Owner of every state, event and manager of an application.
///
/// `D` is the drawing surface type handed to `draw` hooks.
///
/// # Example
///
/// ```rust
/// use stagehand::core::{EventId, HookResult, Lifecycle, Signals};
/// use stagehand::Stage;
/// use std::time::Duration;
///
/// struct Screen(&'static str);
///
/// impl Lifecycle<Vec<&'static str>> for Screen {
///     fn update(&mut self, _elapsed: Duration, _signals: &mut Signals) -> HookResult {
///         Ok(())
///     }
///
///     fn draw(&mut self, surface: &mut Vec<&'static str>) -> HookResult {
///         surface.push(self.0);
///         Ok(())
///     }
/// }
///
/// let mut stage: Stage<Vec<&'static str>> = Stage::new();
/// let menu = stage.add_state("Menu", Screen("menu")).unwrap();
/// let game = stage.add_state("Game", Screen("game")).unwrap();
/// let start = stage.create_event();
///
/// stage.state_mut(menu).unwrap().register_transition(start, "Game");
/// stage.subscribe(menu, start).unwrap();
///
/// let manager = stage.create_manager(Vec::new());
/// stage.register_state(manager, menu).unwrap();
/// stage.register_state(manager, game).unwrap();
/// stage.set_current_state(manager, menu).unwrap();
///
/// stage.cycle(manager).unwrap();
/// assert!(stage.trigger(start).unwrap());
/// stage.cycle(manager).unwrap();
///
/// assert_eq!(stage.current_state(manager), Some(game));
/// assert_eq!(stage.manager(manager).unwrap().surface(), &vec!["menu", "game"]);
/// ```
pub struct Stage<D> {
    config: StageConfig,
    states: StateMap<D>,
    events: HashMap<EventId, Event>,
    managers: HashMap<ManagerId, Manager<D>>,
    next_state: u64,
    next_event: u32,
    next_manager: u64,
}

impl<D> Stage<D> {
    /// Create an empty stage with the default configuration.
    pub fn new() -> Self {
        Self::from_config(StageConfig::default())
    }

    /// Create an empty stage after checking `config`.
    pub fn with_config(config: StageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: StageConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
            events: HashMap::new(),
            managers: HashMap::new(),
            next_state: 0,
            next_event: 0,
            next_manager: 0,
        }
    }

    /// The configuration this stage was created with.
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    // States

    /// Take ownership of `state`. Its name must satisfy the name policy.
    pub fn insert_state(&mut self, state: State<D>) -> Result<StateId, StageError> {
        self.check_name(state.name())?;
        let id = StateId(self.next_state);
        self.next_state += 1;
        debug!(state = %state.name(), %id, "state added");
        self.states.insert(id, state);
        Ok(id)
    }

    /// Create a state from a name and a behavior and insert it.
    pub fn add_state(
        &mut self,
        name: impl Into<String>,
        behavior: impl Lifecycle<D> + 'static,
    ) -> Result<StateId, StageError> {
        self.insert_state(State::new(name, behavior))
    }

    /// Build and insert a state in one go.
    pub fn add(&mut self, builder: StateBuilder<D>) -> Result<StateId, StageError> {
        let state = builder.build()?;
        self.insert_state(state)
    }

    /// The state behind `id`, if it still exists.
    pub fn state(&self, id: StateId) -> Option<&State<D>> {
        self.states.get(&id)
    }

    /// Mutable access for editing transitions and the default target.
    pub fn state_mut(&mut self, id: StateId) -> Option<&mut State<D>> {
        self.states.get_mut(&id)
    }

    /// Look up a state by name anywhere in the stage.
    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .filter(|(_, s)| s.name() == name)
            .map(|(id, _)| *id)
            .min()
    }

    /// Every state in the stage, in no particular order.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &State<D>)> {
        self.states.iter().map(|(id, s)| (*id, s))
    }

    /// Rename a state and keep its manager's bookkeeping in step.
    ///
    /// Fails without changing anything when the name is too short. The new
    /// name must also be free among the states of its manager and among the
    /// subscribers of each of its events.
    pub fn rename_state(&mut self, id: StateId, name: impl Into<String>) -> Result<(), StageError> {
        let name = name.into();
        let state = self.states.get(&id).ok_or(StageError::UnknownState(id))?;
        self.check_name(&name)?;

        let old = state.name().to_owned();
        if old == name {
            return Ok(());
        }

        let manager = state.manager();
        if let Some(manager_id) = manager {
            if let Some(manager) = self.managers.get(&manager_id) {
                if manager.find(&self.states, &name).is_some() {
                    return Err(StageError::NameTaken {
                        name,
                        manager: manager_id,
                    });
                }
            }
        }
        for event in state.events() {
            let taken = self.events.get(event).is_some_and(|entry| {
                entry
                    .subscribers()
                    .iter()
                    .filter_map(|s| self.states.get(s))
                    .any(|s| s.name() == name)
            });
            if taken {
                return Err(StageError::SubscriberNameTaken {
                    name,
                    event: *event,
                });
            }
        }

        let policy = self.config.name_policy();
        if let Some(state) = self.states.get_mut(&id) {
            let renamed = state.rename(name.as_str(), &policy);
            debug_assert!(renamed, "name policy already checked");
        }
        if let Some(manager) = manager.and_then(|m| self.managers.get_mut(&m)) {
            manager.rename_refs(&old, &name);
        }
        debug!(%id, from = %old, to = %name, "state renamed");
        Ok(())
    }

    /// Remove a state from the stage, every event and its manager.
    ///
    /// A state that is current is halted first, so its `clean_up` runs.
    /// The behavior is handed back to the caller.
    pub fn destroy_state(&mut self, id: StateId) -> Result<Box<dyn Lifecycle<D>>, StageError> {
        let state = self.states.get(&id).ok_or(StageError::UnknownState(id))?;
        let events = state.events().to_vec();
        let manager = state.manager();

        for event in events {
            if let Some(event) = self.events.get_mut(&event) {
                event.remove(id);
            }
        }
        if let Some(manager) = manager {
            self.detach(manager, id);
        }

        let state = self.states.remove(&id).ok_or(StageError::UnknownState(id))?;
        debug!(%id, state = %state.name(), "state destroyed");
        Ok(state.into_behavior())
    }

    // Events

    /// Create an event with the next free id.
    pub fn create_event(&mut self) -> EventId {
        while self.events.contains_key(&EventId(self.next_event)) {
            self.next_event = self.next_event.wrapping_add(1);
        }
        let id = EventId(self.next_event);
        self.next_event = self.next_event.wrapping_add(1);
        self.events.insert(id, Event::new(id));
        id
    }

    /// Create an event with a chosen id.
    pub fn create_event_with_id(&mut self, id: EventId) -> Result<EventId, StageError> {
        if self.events.contains_key(&id) {
            return Err(StageError::DuplicateEvent(id));
        }
        self.events.insert(id, Event::new(id));
        self.bump_event_counter(id);
        Ok(id)
    }

    /// The event behind `id`, if it still exists.
    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    /// Change an event's id. Subscribers follow; transition tables are keyed
    /// by id and are left to the application.
    pub fn set_event_id(&mut self, old: EventId, new: EventId) -> Result<(), StageError> {
        if !self.events.contains_key(&old) {
            return Err(StageError::UnknownEvent(old));
        }
        if old == new {
            return Ok(());
        }
        if self.events.contains_key(&new) {
            return Err(StageError::DuplicateEvent(new));
        }

        let mut event = self.events.remove(&old).ok_or(StageError::UnknownEvent(old))?;
        event.set_id(new);
        for subscriber in event.subscribers() {
            if let Some(state) = self.states.get_mut(subscriber) {
                state.replace_event(old, new);
            }
        }
        self.events.insert(new, event);
        self.bump_event_counter(new);
        Ok(())
    }

    /// Remove an event and unlink it from every subscribed state.
    pub fn destroy_event(&mut self, id: EventId) -> Result<Event, StageError> {
        let event = self.events.remove(&id).ok_or(StageError::UnknownEvent(id))?;
        for subscriber in event.subscribers() {
            if let Some(state) = self.states.get_mut(subscriber) {
                state.remove_event(id);
            }
        }
        debug!(event = %id, subscribers = event.subscribers().len(), "event destroyed");
        Ok(event)
    }

    /// Subscribe `state` to `event`.
    ///
    /// Subscriptions are unique by state name: a different state with the
    /// same name is displaced, and subscribing twice changes nothing.
    pub fn subscribe(&mut self, state: StateId, event: EventId) -> Result<(), StageError> {
        let name = self
            .states
            .get(&state)
            .ok_or(StageError::UnknownState(state))?
            .name()
            .to_owned();
        let entry = self
            .events
            .get_mut(&event)
            .ok_or(StageError::UnknownEvent(event))?;

        let displaced: Vec<StateId> = entry
            .subscribers()
            .iter()
            .copied()
            .filter(|s| *s != state)
            .filter(|s| self.states.get(s).is_some_and(|s| s.name() == name))
            .collect();
        for other in displaced {
            entry.remove(other);
            if let Some(other) = self.states.get_mut(&other) {
                other.remove_event(event);
            }
        }

        entry.add(state);
        if let Some(state) = self.states.get_mut(&state) {
            state.add_event(event);
        }
        debug!(state = %name, %event, "subscribed");
        Ok(())
    }

    /// Remove the subscriber named like `state` from `event`. No-op when
    /// there is none.
    pub fn unsubscribe(&mut self, state: StateId, event: EventId) -> Result<(), StageError> {
        let name = self
            .states
            .get(&state)
            .ok_or(StageError::UnknownState(state))?
            .name()
            .to_owned();
        let entry = self
            .events
            .get_mut(&event)
            .ok_or(StageError::UnknownEvent(event))?;

        let matching: Vec<StateId> = entry
            .subscribers()
            .iter()
            .copied()
            .filter(|s| self.states.get(s).is_some_and(|s| s.name() == name))
            .collect();
        for id in matching {
            entry.remove(id);
            if let Some(state) = self.states.get_mut(&id) {
                state.remove_event(event);
            }
        }
        Ok(())
    }

    /// Notify every subscriber of `event`.
    ///
    /// Returns `Ok(true)` when the event had at least one subscriber, whether
    /// or not any of them recorded a transition.
    pub fn trigger(&mut self, event: EventId) -> Result<bool, StageError> {
        let entry = self.events.get(&event).ok_or(StageError::UnknownEvent(event))?;
        if entry.is_empty() {
            return Ok(false);
        }

        let mut accepted = 0usize;
        for subscriber in entry.subscribers() {
            if let Some(state) = self.states.get_mut(subscriber) {
                if state.on_event(event) {
                    accepted += 1;
                }
            }
        }
        debug!(%event, subscribers = entry.subscribers().len(), accepted, "event triggered");
        Ok(true)
    }

    // Managers

    /// Create a manager driven by the wall clock.
    pub fn create_manager(&mut self, surface: D) -> ManagerId {
        self.create_manager_with_clock(surface, MonotonicClock::new())
    }

    /// Create a manager driven by `clock`, e.g. a [`ManualClock`](crate::manager::ManualClock) in tests.
    pub fn create_manager_with_clock(
        &mut self,
        surface: D,
        clock: impl Clock + 'static,
    ) -> ManagerId {
        let id = ManagerId(self.next_manager);
        self.next_manager += 1;
        self.managers
            .insert(id, Manager::new(id, surface, Box::new(clock), &self.config));
        id
    }

    /// The manager behind `id`, if it still exists.
    pub fn manager(&self, id: ManagerId) -> Option<&Manager<D>> {
        self.managers.get(&id)
    }

    /// Mutable access to a manager, mostly for its surface.
    pub fn manager_mut(&mut self, id: ManagerId) -> Option<&mut Manager<D>> {
        self.managers.get_mut(&id)
    }

    /// Remove a manager and return its surface.
    ///
    /// The current state is halted; every registered state forgets the
    /// manager but stays in the stage.
    pub fn destroy_manager(&mut self, id: ManagerId) -> Result<D, StageError> {
        let mut manager = self
            .managers
            .remove(&id)
            .ok_or(StageError::UnknownManager(id))?;
        manager.halt(&mut self.states);
        for state in manager.registered() {
            if let Some(state) = self.states.get_mut(state) {
                state.set_manager(None);
            }
        }
        debug!(manager = %id, "manager destroyed");
        Ok(manager.into_surface())
    }

    /// Register `state` with `manager`.
    ///
    /// A state belongs to at most one manager, so it leaves any previous one.
    /// A different state of the same name is unregistered first.
    pub fn register_state(&mut self, manager: ManagerId, state: StateId) -> Result<(), StageError> {
        if !self.managers.contains_key(&manager) {
            return Err(StageError::UnknownManager(manager));
        }
        let target = self.states.get(&state).ok_or(StageError::UnknownState(state))?;
        let name = target.name().to_owned();

        if let Some(other) = target.manager().filter(|m| *m != manager) {
            self.detach(other, state);
        }
        let namesake = self
            .managers
            .get(&manager)
            .and_then(|entry| entry.find(&self.states, &name))
            .filter(|id| *id != state);
        if let Some(namesake) = namesake {
            self.detach(manager, namesake);
        }

        if let Some(entry) = self.managers.get_mut(&manager) {
            entry.add(state);
        }
        if let Some(target) = self.states.get_mut(&state) {
            target.set_manager(Some(manager));
        }
        debug!(%manager, state = %name, "state registered");
        Ok(())
    }

    /// Unregister the state named like `state` from `manager`. A current
    /// state is halted first. No-op when absent.
    pub fn unregister_state(&mut self, manager: ManagerId, state: StateId) -> Result<(), StageError> {
        let entry = self
            .managers
            .get(&manager)
            .ok_or(StageError::UnknownManager(manager))?;
        let name = self
            .states
            .get(&state)
            .ok_or(StageError::UnknownState(state))?
            .name();

        let registered = entry.find(&self.states, name);
        if let Some(registered) = registered {
            self.detach(manager, registered);
        }
        Ok(())
    }

    /// Make `state` current immediately, bypassing events.
    ///
    /// The previous current state gets `clean_up`, the new one `init`.
    /// Hook failures are returned for inspection.
    pub fn set_current_state(
        &mut self,
        manager: ManagerId,
        state: StateId,
    ) -> Result<Vec<HookFailure>, StageError> {
        let entry = self
            .managers
            .get_mut(&manager)
            .ok_or(StageError::UnknownManager(manager))?;
        if !self.states.contains_key(&state) {
            return Err(StageError::UnknownState(state));
        }
        if !entry.contains(state) {
            return Err(StageError::NotRegistered { state, manager });
        }
        Ok(entry.set_current(&mut self.states, state))
    }

    /// Handle of the manager's current state. `None` for an unknown manager.
    pub fn current_state(&self, manager: ManagerId) -> Option<StateId> {
        self.managers.get(&manager)?.current_id(&self.states)
    }

    /// Run one cycle of `manager`, then trigger the events its hooks
    /// signalled.
    pub fn cycle(&mut self, manager: ManagerId) -> Result<CycleReport, StageError> {
        let entry = self
            .managers
            .get_mut(&manager)
            .ok_or(StageError::UnknownManager(manager))?;
        let (mut report, mut signals) = entry.cycle(&mut self.states);

        for event in signals.drain() {
            if self.trigger(event).is_err() {
                warn!(%manager, %event, "hook signalled an unknown event");
                report.dropped_signals.push(event);
            }
        }
        Ok(report)
    }

    /// Retire the current state without selecting a replacement.
    pub fn halt(&mut self, manager: ManagerId) -> Result<Vec<HookFailure>, StageError> {
        let entry = self
            .managers
            .get_mut(&manager)
            .ok_or(StageError::UnknownManager(manager))?;
        Ok(entry.halt(&mut self.states))
    }

    /// Diagnostic snapshot of `manager` and its states.
    pub fn snapshot(&self, manager: ManagerId) -> Result<Snapshot, StageError> {
        let entry = self
            .managers
            .get(&manager)
            .ok_or(StageError::UnknownManager(manager))?;
        Ok(Snapshot::capture(entry, &self.states))
    }

    fn check_name(&self, name: &str) -> Result<(), StageError> {
        let policy = self.config.name_policy();
        if policy.accepts(name) {
            Ok(())
        } else {
            Err(StageError::InvalidName {
                name: name.to_string(),
                min_len: policy.min_len,
            })
        }
    }

    fn bump_event_counter(&mut self, id: EventId) {
        if id.0 >= self.next_event {
            self.next_event = id.0.wrapping_add(1);
        }
    }

    /// Take `state` out of `manager`, halting it when current, and clear its
    /// back-reference.
    fn detach(&mut self, manager: ManagerId, state: StateId) {
        if let Some(entry) = self.managers.get_mut(&manager) {
            if entry.current_id(&self.states) == Some(state) {
                entry.halt(&mut self.states);
            }
            entry.remove(state);
        }
        if let Some(state) = self.states.get_mut(&state) {
            state.set_manager(None);
            debug!(%manager, state = %state.name(), "state unregistered");
        }
    }
}

impl<D> Default for Stage<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for Stage<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("config", &self.config)
            .field("states", &self.states)
            .field("events", &self.events)
            .field("managers", &self.managers)
            .finish()
    }
}
