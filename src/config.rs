//! Stage configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`StageConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse stage config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid stage config: {0}")]
    Invalid(String),
}

/// Minimum length accepted for state names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePolicy {
    pub min_len: usize,
}

impl NamePolicy {
    /// Whether `name` is long enough to be used.
    pub fn accepts(&self, name: &str) -> bool {
        !name.is_empty() && name.chars().count() >= self.min_len
    }
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self { min_len: 1 }
    }
}

/// Tunables for a [`Stage`](crate::stage::Stage).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use stagehand::StageConfig;
///
/// let config = StageConfig::from_json(r#"{ "min_name_len": 2 }"#).unwrap();
/// assert_eq!(config.min_name_len, 2);
/// assert!(config.record_history);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Shortest state name accepted on insert and rename.
    pub min_name_len: usize,

    /// Whether managers keep a transition history.
    pub record_history: bool,

    /// Oldest records are dropped beyond this many. `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            min_name_len: 1,
            record_history: true,
            history_limit: None,
        }
    }
}

impl StageConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no stage can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_name_len == 0 {
            return Err(ConfigError::Invalid(
                "min_name_len must be at least 1".to_string(),
            ));
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "history_limit must be positive; disable record_history instead".to_string(),
            ));
        }
        Ok(())
    }

    /// The name rule derived from `min_name_len`.
    pub fn name_policy(&self) -> NamePolicy {
        NamePolicy {
            min_len: self.min_name_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config = StageConfig::from_json("{}").unwrap();
        assert_eq!(config, StageConfig::default());
    }

    #[test]
    fn rejects_zero_min_name_len() {
        let result = StageConfig::from_json(r#"{ "min_name_len": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_history_limit() {
        let result = StageConfig::from_json(r#"{ "history_limit": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let result = StageConfig::from_json("{ min_name_len: ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn name_policy_enforces_minimum() {
        let policy = NamePolicy { min_len: 2 };
        assert!(!policy.accepts(""));
        assert!(!policy.accepts("A"));
        assert!(policy.accepts("Ab"));

        let lenient = NamePolicy::default();
        assert!(!lenient.accepts(""));
        assert!(lenient.accepts("A"));
    }
}
