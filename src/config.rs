use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Settings of a [`crate::BehaviorTree`].
///
/// ```yaml
/// name: guard
/// reset_on_complete: true
/// max_delta_time: 0.25
/// trace_ticks: false
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Shown in log events of this tree.
    pub name: String,
    /// Reset the root after it returns a non-`Running` status, so the next tick starts a fresh run.
    pub reset_on_complete: bool,
    /// Upper bound applied to the delta time of a single tick, to keep frame
    /// spikes from expiring every timeout at once.
    pub max_delta_time: Option<f32>,
    /// Install a [`crate::TracingSink`] unless another sink is set.
    pub trace_ticks: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            name: "main".to_owned(),
            reset_on_complete: true,
            max_delta_time: None,
            trace_ticks: false,
        }
    }
}

impl TreeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.max_delta_time {
            Some(max) if !(max.is_finite() && max > 0.) => {
                Err(ConfigError::InvalidMaxDeltaTime(max))
            }
            _ => Ok(()),
        }
    }

    /// Negative or NaN deltas count as zero elapsed time.
    pub(crate) fn clamp_delta_time(&self, delta_time: f32) -> f32 {
        let delta_time = delta_time.max(0.);
        match self.max_delta_time {
            Some(max) => delta_time.min(max),
            None => delta_time,
        }
    }
}
