//! EffectsConfig - knobs for how actions are recognized.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, EFFECT, EFFECT_COMPOSE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// `type` values that mark a JSON action as an effect action.
    pub effect_tags: Vec<String>,

    /// Normalize legacy declarative promises. When off they are forwarded
    /// as plain actions.
    pub accept_legacy: bool,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            effect_tags: vec![EFFECT.to_string(), EFFECT_COMPOSE.to_string()],
            accept_legacy: true,
        }
    }
}

impl EffectsConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn is_effect_tag(&self, tag: &str) -> bool {
        self.effect_tags.iter().any(|t| t == tag)
    }
}
