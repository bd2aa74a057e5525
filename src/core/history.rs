//! Transition history kept by each manager.
//!
//! History is an immutable value: recording returns a new history and leaves
//! the old one untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a state became current.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionCause {
    /// An event was triggered and the manager applied it during a cycle.
    Triggered,
    /// The application called `set_current_state`.
    Forced,
}

/// Record of one activation.
///
/// # Example
///
/// ```rust
/// use stagehand::core::{TransitionCause, TransitionRecord};
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     from: Some("Menu".to_string()),
///     to: "Game".to_string(),
///     cause: TransitionCause::Triggered,
///     cycle: 12,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, "Game");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State that was current before, if any.
    pub from: Option<String>,
    /// State that became current.
    pub to: String,
    pub cause: TransitionCause,
    /// Manager cycle during which the transition happened.
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of activations.
///
/// # Example
///
/// ```rust
/// use stagehand::core::{TransitionCause, TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let history = TransitionHistory::new()
///     .record(TransitionRecord {
///         from: None,
///         to: "Menu".to_string(),
///         cause: TransitionCause::Forced,
///         cycle: 0,
///         timestamp: Utc::now(),
///     })
///     .record(TransitionRecord {
///         from: Some("Menu".to_string()),
///         to: "Game".to_string(),
///         cause: TransitionCause::Triggered,
///         cycle: 3,
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.get_path(), vec!["Menu", "Game"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    transitions: Vec<TransitionRecord>,
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: TransitionRecord) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Keep only the newest `limit` records.
    pub fn truncated(&self, limit: usize) -> Self {
        let skip = self.transitions.len().saturating_sub(limit);
        Self {
            transitions: self.transitions[skip..].to_vec(),
        }
    }

    /// Names of the states traversed, in order.
    ///
    /// Starts with the `from` of the first record when there is one, then
    /// lists the `to` of every record. A record whose `from` differs from the
    /// previous `to` (a `halt` happened in between) does not insert the gap.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(from) = self.transitions.first().and_then(|t| t.from.as_deref()) {
            path.push(from);
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Time between the first and last record, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// All records, oldest first.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// The newest record.
    pub fn last(&self) -> Option<&TransitionRecord> {
        self.transitions.last()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: Option<&str>, to: &str, cycle: u64) -> TransitionRecord {
        TransitionRecord {
            from: from.map(str::to_string),
            to: to.to_string(),
            cause: TransitionCause::Triggered,
            cycle,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = TransitionHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = TransitionHistory::new();
        let new_history = history.record(record(None, "Menu", 0));

        assert_eq!(history.len(), 0);
        assert_eq!(new_history.len(), 1);
    }

    #[test]
    fn path_starts_at_first_origin() {
        let history = TransitionHistory::new()
            .record(record(Some("Splash"), "Menu", 1))
            .record(record(Some("Menu"), "Game", 5));

        assert_eq!(history.get_path(), vec!["Splash", "Menu", "Game"]);
    }

    #[test]
    fn path_without_origin_starts_at_first_target() {
        let history = TransitionHistory::new()
            .record(record(None, "Menu", 0))
            .record(record(Some("Menu"), "Game", 2));

        assert_eq!(history.get_path(), vec!["Menu", "Game"]);
    }

    #[test]
    fn truncated_keeps_newest() {
        let history = TransitionHistory::new()
            .record(record(None, "A", 0))
            .record(record(Some("A"), "B", 1))
            .record(record(Some("B"), "C", 2));

        let kept = history.truncated(2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.transitions()[0].to, "B");
        assert_eq!(kept.last().map(|r| r.to.as_str()), Some("C"));

        assert_eq!(history.truncated(10).len(), 3);
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let mut first = record(None, "A", 0);
        first.timestamp = start;
        let mut second = record(Some("A"), "B", 1);
        second.timestamp = start + chrono::Duration::milliseconds(250);

        let history = TransitionHistory::new().record(first).record(second);
        assert_eq!(history.duration(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn single_record_has_zero_duration() {
        let history = TransitionHistory::new().record(record(None, "A", 0));
        assert_eq!(history.duration(), Some(Duration::ZERO));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = TransitionHistory::new().record(record(Some("A"), "B", 4));
        let json = serde_json::to_string(&history).unwrap();
        let deserialized: TransitionHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(history, deserialized);
    }
}
