//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// What the engine does when a rule's condition or action fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the whole execution and return the failure.
    #[default]
    Abort,
    /// Log the failure, abandon that rule for the current pass and carry on
    /// with the next one.
    SkipRule,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of passes before giving up with `CycleExceeded`.
    pub max_cycle: u64,
    /// Handling of failing conditions and actions.
    pub error_policy: ErrorPolicy,
}

impl EngineConfig {
    /// Default pass budget.
    pub const DEFAULT_MAX_CYCLE: u64 = 5000;

    /// Parses a JSON configuration; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for malformed JSON and the `validate` errors.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration is usable.
    ///
    /// # Errors
    /// Returns `InvalidMaxCycle` when `max_cycle` is zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_cycle == 0 {
            return Err(ValidationError::InvalidMaxCycle {
                value: self.max_cycle,
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cycle: Self::DEFAULT_MAX_CYCLE,
            error_policy: ErrorPolicy::Abort,
        }
    }
}
