//! Timeline assembly configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What the assembler does after a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContinuationPolicy {
    /// Stop at the first failing step.
    #[default]
    Halt,
    /// Record the failure and go on from the unchanged state.
    Continue,
}

/// Limits and policies for [`Timeline::assemble`](crate::timeline::Timeline::assemble).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineConfig {
    /// Behavior after a failing step.
    pub continuation: ContinuationPolicy,
    /// Maximum number of steps accepted in one protocol.
    pub max_steps: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            continuation: ContinuationPolicy::Halt,
            max_steps: 10_000,
        }
    }
}

impl TimelineConfig {
    /// Config that keeps going past failing steps.
    #[must_use]
    pub fn continue_on_error() -> Self {
        Self {
            continuation: ContinuationPolicy::Continue,
            ..Self::default()
        }
    }

    /// Validate the config.
    ///
    /// Called by the assembler before any step runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid {
                reason: "max_steps must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Checks a protocol of `steps` steps fits the configured limit.
    pub fn check_step_count(&self, steps: usize) -> Result<(), ConfigError> {
        if steps > self.max_steps {
            return Err(ConfigError::TooManySteps {
                max: self.max_steps,
                actual: steps,
            });
        }
        Ok(())
    }
}
