//! Diagnostic snapshots of a manager.
//!
//! A snapshot freezes a manager's bookkeeping, the view of each registered
//! state and the transition history into a serializable value, for logging,
//! debugging overlays or bug reports. Snapshots are never loaded back into a
//! stage: behaviors are arbitrary code and are not part of them.

use crate::core::{EventId, ManagerId, TransitionHistory};
use crate::manager::Manager;
use crate::stage::StateMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// What a snapshot records about one state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateView {
    pub name: String,
    pub active: bool,
    pub triggered: bool,
    /// Target of a triggered transition. `None` while untriggered, even
    /// with a default configured.
    pub pending: Option<String>,
    pub default_next: Option<String>,
    pub transitions: BTreeMap<EventId, String>,
    pub events: Vec<EventId>,
}

/// Serializable picture of a manager at one point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    pub manager: ManagerId,

    /// Cycles run by the manager so far
    pub cycle: u64,

    pub current: Option<String>,
    pub next: Option<String>,
    pub previous: Option<String>,

    /// Registered states, sorted by name
    pub states: Vec<StateView>,

    pub history: TransitionHistory,
}

impl Snapshot {
    pub(crate) fn capture<D>(manager: &Manager<D>, states: &StateMap<D>) -> Self {
        let mut views: Vec<StateView> = manager
            .registered()
            .iter()
            .filter_map(|id| states.get(id))
            .map(|state| StateView {
                name: state.name().to_string(),
                active: state.is_active(),
                triggered: state.is_triggered(),
                pending: state
                    .is_triggered()
                    .then(|| state.pending_next_state())
                    .flatten()
                    .map(str::to_string),
                default_next: state.default_next().map(str::to_string),
                transitions: state.transitions().clone(),
                events: state.events().to_vec(),
            })
            .collect();
        views.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            manager: manager.id(),
            cycle: manager.cycles(),
            current: manager.current_name().map(str::to_string),
            next: manager.next_name().map(str::to_string),
            previous: manager.previous_name().map(str::to_string),
            states: views,
            history: manager.history().clone(),
        }
    }

    /// The view of the registered state called `name`.
    pub fn state(&self, name: &str) -> Option<&StateView> {
        self.states.iter().find(|s| s.name == name)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from JSON, rejecting other format versions.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Serialize to a compact binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from the binary form, rejecting other format versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    fn check_version(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Idle;
    use crate::manager::ManualClock;
    use crate::stage::Stage;

    fn menu_stage() -> (Stage<()>, ManagerId) {
        let mut stage: Stage<()> = Stage::new();
        let menu = stage.add_state("Menu", Idle).unwrap();
        let game = stage.add_state("Game", Idle).unwrap();
        let start = stage.create_event_with_id(EventId(1)).unwrap();
        stage.state_mut(menu).unwrap().register_transition(start, "Game");
        stage.subscribe(menu, start).unwrap();

        let manager = stage.create_manager_with_clock((), ManualClock::new());
        stage.register_state(manager, menu).unwrap();
        stage.register_state(manager, game).unwrap();
        stage.set_current_state(manager, menu).unwrap();
        (stage, manager)
    }

    #[test]
    fn snapshot_captures_bookkeeping() {
        let (mut stage, manager) = menu_stage();
        stage.trigger(EventId(1)).unwrap();

        let snapshot = stage.snapshot(manager).unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.current.as_deref(), Some("Menu"));
        assert_eq!(snapshot.states.len(), 2);
        assert_eq!(snapshot.states[0].name, "Game");

        let menu = snapshot.state("Menu").unwrap();
        assert!(menu.active);
        assert!(menu.triggered);
        assert_eq!(menu.pending.as_deref(), Some("Game"));
        assert_eq!(menu.events, vec![EventId(1)]);
        assert_eq!(snapshot.history.len(), 1);
    }

    #[test]
    fn default_alone_is_not_pending() {
        let (mut stage, manager) = menu_stage();
        let game = stage.find_state("Game").unwrap();
        stage.state_mut(game).unwrap().set_default_next("Menu");

        let snapshot = stage.snapshot(manager).unwrap();
        let game = snapshot.state("Game").unwrap();
        assert!(!game.triggered);
        assert_eq!(game.pending, None);
        assert_eq!(game.default_next.as_deref(), Some("Menu"));
    }

    #[test]
    fn json_encoding_preserves_snapshot() {
        let (stage, manager) = menu_stage();
        let snapshot = stage.snapshot(manager).unwrap();

        let json = snapshot.to_json().unwrap();
        let decoded = Snapshot::from_json(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn binary_encoding_preserves_snapshot() {
        let (stage, manager) = menu_stage();
        let snapshot = stage.snapshot(manager).unwrap();

        let bytes = snapshot.to_bytes().unwrap();
        let decoded = Snapshot::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn rejects_unknown_version() {
        let (stage, manager) = menu_stage();
        let mut snapshot = stage.snapshot(manager).unwrap();
        snapshot.version = 99;

        let json = snapshot.to_json().unwrap();
        assert!(matches!(
            Snapshot::from_json(&json),
            Err(SnapshotError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn garbage_is_a_deserialization_error() {
        assert!(matches!(
            Snapshot::from_json("not json"),
            Err(SnapshotError::DeserializationFailed(_))
        ));
        assert!(matches!(
            Snapshot::from_bytes(&[1, 2, 3]),
            Err(SnapshotError::DeserializationFailed(_))
        ));
    }
}
