//! Hunt configuration: the ordered stage list plus hunt-wide settings.

use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Distance below which a stage counts as found when neither the hunt nor the
/// stage overrides it. Earlier revisions of the hunt used 10 m; 15 m copes better
/// with phone GPS drift under trees.
pub const DEFAULT_PROXIMITY_THRESHOLD_M: f64 = 15.0;

const DEFAULT_COMPLETION_MESSAGE: &str = "You found every spot!";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read hunt configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse hunt configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid hunt configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuntConfig {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default = "default_threshold")]
    pub proximity_threshold_m: f64,

    /// Shown once the player advances past the final stage.
    #[serde(default = "default_completion_message")]
    pub completion_message: String,

    pub stages: Vec<Stage>,
}

fn default_threshold() -> f64 {
    DEFAULT_PROXIMITY_THRESHOLD_M
}

fn default_completion_message() -> String {
    DEFAULT_COMPLETION_MESSAGE.to_owned()
}

impl HuntConfig {
    /// Build a validated configuration from stages in play order.
    pub fn new(stages: Vec<Stage>) -> Result<Self, ConfigError> {
        let config = Self {
            title: None,
            proximity_threshold_m: DEFAULT_PROXIMITY_THRESHOLD_M,
            completion_message: default_completion_message(),
            stages,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_threshold(mut self, meters: f64) -> Result<Self, ConfigError> {
        self.proximity_threshold_m = meters;
        self.validate()?;
        Ok(self)
    }

    pub fn with_completion_message(mut self, message: impl Into<String>) -> Self {
        self.completion_message = message.into();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Effective proximity threshold for the stage at `index`.
    pub fn threshold_for(&self, index: usize) -> f64 {
        self.stages
            .get(index)
            .and_then(|stage| stage.proximity_threshold_m)
            .unwrap_or(self.proximity_threshold_m)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stages.is_empty() {
            return Err(ConfigError::Invalid("a hunt needs at least one stage".into()));
        }

        check_threshold(self.proximity_threshold_m, "hunt")?;

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.id) {
                return Err(ConfigError::Invalid(format!(
                    "stage id {} appears more than once",
                    stage.id
                )));
            }

            if !stage.target.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "stage {} has a non-numeric target {}",
                    stage.id, stage.target
                )));
            }

            if let Some(threshold) = stage.proximity_threshold_m {
                check_threshold(threshold, &format!("stage {}", stage.id))?;
            }
        }

        Ok(())
    }
}

fn check_threshold(meters: f64, owner: &str) -> Result<(), ConfigError> {
    if meters > 0.0 && meters.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{owner} proximity threshold must be a positive distance, got {meters}"
        )))
    }
}
