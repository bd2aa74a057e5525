//! Property-based tests for states, events and managers.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use chrono::Utc;
use proptest::prelude::*;
use stagehand::core::{
    EventId, Idle, State, TransitionCause, TransitionHistory, TransitionRecord,
};
use stagehand::manager::ManualClock;
use stagehand::Stage;
use std::collections::HashSet;

prop_compose! {
    fn state_name()(name in "[A-Z][a-z]{0,8}") -> String {
        name
    }
}

prop_compose! {
    fn event_table()(
        entries in prop::collection::vec((0..16u32, prop_oneof![Just(String::new()), state_name()]), 0..8)
    ) -> Vec<(EventId, String)> {
        entries.into_iter().map(|(id, name)| (EventId(id), name)).collect()
    }
}

fn record(from: Option<&str>, to: &str) -> TransitionRecord {
    TransitionRecord {
        from: from.map(str::to_string),
        to: to.to_string(),
        cause: TransitionCause::Triggered,
        cycle: 0,
        timestamp: Utc::now(),
    }
}

fn history_through(names: &[String]) -> TransitionHistory {
    let mut history = TransitionHistory::new();
    for (i, name) in names.iter().enumerate() {
        let from = if i == 0 { None } else { Some(names[i - 1].as_str()) };
        history = history.record(record(from, name));
    }
    history
}

proptest! {
    #[test]
    fn inactive_state_ignores_events(table in event_table(), event in 0..16u32) {
        let mut state: State<()> = State::new("Menu", Idle);
        for (id, next) in &table {
            state.register_transition(*id, next.clone());
        }
        let before = state.transitions().clone();

        prop_assert!(!state.on_event(EventId(event)));
        prop_assert!(!state.is_triggered());
        prop_assert_eq!(state.pending_next_state(), None);
        prop_assert_eq!(state.transitions(), &before);
    }

    #[test]
    fn mapped_events_are_never_empty(table in event_table(), event in 0..16u32) {
        let mut state: State<()> = State::new("Menu", Idle);
        for (id, next) in &table {
            state.register_transition(*id, next.clone());
        }
        if let Some(target) = state.transition(EventId(event)) {
            prop_assert!(!target.is_empty());
        }
    }

    #[test]
    fn active_state_follows_its_table(table in event_table(), event in 0..16u32) {
        let mut stage: Stage<()> = Stage::new();
        let id = EventId(event);
        stage.create_event_with_id(id).unwrap();
        let menu = stage.add_state("Menu", Idle).unwrap();
        for (mapped, next) in &table {
            stage.state_mut(menu).unwrap().register_transition(*mapped, next.clone());
        }
        stage.subscribe(menu, id).unwrap();
        let manager = stage.create_manager_with_clock((), ManualClock::new());
        stage.register_state(manager, menu).unwrap();
        stage.set_current_state(manager, menu).unwrap();

        let expected = stage.state(menu).unwrap().transition(id).map(str::to_string);
        prop_assert!(stage.trigger(id).unwrap());

        let state = stage.state(menu).unwrap();
        prop_assert_eq!(state.is_triggered(), expected.is_some());
        prop_assert_eq!(state.pending_next_state().map(str::to_string), expected);
    }

    #[test]
    fn trigger_reports_whether_anyone_listens(subscribers in 0..6usize) {
        let mut stage: Stage<()> = Stage::new();
        let event = stage.create_event();
        for i in 0..subscribers {
            let state = stage.add_state(format!("Screen{i}"), Idle).unwrap();
            stage.subscribe(state, event).unwrap();
        }

        prop_assert_eq!(stage.trigger(event).unwrap(), subscribers > 0);
        prop_assert_eq!(stage.event(event).unwrap().subscribers().len(), subscribers);
    }

    #[test]
    fn subscribe_is_idempotent(times in 1..6usize) {
        let mut stage: Stage<()> = Stage::new();
        let event = stage.create_event();
        let menu = stage.add_state("Menu", Idle).unwrap();

        for _ in 0..times {
            stage.subscribe(menu, event).unwrap();
        }

        prop_assert_eq!(stage.event(event).unwrap().subscribers(), &[menu]);
        prop_assert_eq!(stage.state(menu).unwrap().events(), &[event]);
    }

    #[test]
    fn event_ids_stay_unique(explicit in prop::collection::hash_set(0..32u32, 0..6), automatic in 0..8usize) {
        let mut stage: Stage<()> = Stage::new();
        let mut seen = HashSet::new();
        for id in &explicit {
            seen.insert(stage.create_event_with_id(EventId(*id)).unwrap());
        }
        for _ in 0..automatic {
            prop_assert!(seen.insert(stage.create_event()));
        }
        prop_assert_eq!(seen.len(), explicit.len() + automatic);
    }

    #[test]
    fn current_state_survives_idle_cycles(cycles in 1..40usize) {
        let mut stage: Stage<()> = Stage::new();
        let menu = stage.add_state("Menu", Idle).unwrap();
        let game = stage.add_state("Game", Idle).unwrap();
        let manager = stage.create_manager_with_clock((), ManualClock::new());
        stage.register_state(manager, menu).unwrap();
        stage.register_state(manager, game).unwrap();
        stage.set_current_state(manager, menu).unwrap();

        for _ in 0..cycles {
            let report = stage.cycle(manager).unwrap();
            prop_assert!(report.dispatched);
            prop_assert!(!report.transitioned());
        }

        prop_assert_eq!(stage.current_state(manager), Some(menu));
        prop_assert_eq!(stage.manager(manager).unwrap().cycles(), cycles as u64);
    }

    #[test]
    fn history_preserves_order(names in prop::collection::vec(state_name(), 1..10)) {
        let history = history_through(&names);
        let path = history.get_path();

        prop_assert_eq!(path.len(), names.len());
        for (step, name) in path.iter().zip(&names) {
            prop_assert_eq!(*step, name.as_str());
        }
    }

    #[test]
    fn history_record_is_pure(from in state_name(), to in state_name()) {
        let history = TransitionHistory::new();
        let recorded = history.record(record(Some(&from), &to));

        prop_assert!(history.is_empty());
        prop_assert_eq!(recorded.len(), 1);
        prop_assert_eq!(recorded.get_path(), vec![from.as_str(), to.as_str()]);
    }

    #[test]
    fn truncation_keeps_newest(names in prop::collection::vec(state_name(), 1..12), limit in 1..6usize) {
        let history = history_through(&names);
        let truncated = history.truncated(limit);

        prop_assert_eq!(truncated.len(), names.len().min(limit));
        prop_assert_eq!(truncated.last(), history.last());
    }

    #[test]
    fn history_roundtrip_serialization(names in prop::collection::vec(state_name(), 0..5)) {
        let history = history_through(&names);

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: TransitionHistory = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(history, deserialized);
    }
}
