use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::EmitterConfig;
use crate::error::EmitterError;

/// A named emitter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterPreset {
    pub name: String,
    #[serde(flatten)]
    pub config: EmitterConfig,
}

/// A set of emitter presets, stored as JSON:
///
/// ```json
/// { "emitters": [ { "name": "sparks", "max_particles": 500, "max_lifetime": 1.5 } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetFile {
    pub emitters: Vec<EmitterPreset>,
}

impl PresetFile {
    /// Parses and validates every preset.
    pub fn from_json_str(src: &str) -> Result<Self, EmitterError> {
        let file: PresetFile = serde_json::from_str(src)?;
        file.validate()?;
        log::debug!("loaded {} emitter preset(s)", file.emitters.len());
        Ok(file)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EmitterError> {
        let src = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&src)
    }

    pub fn validate(&self) -> Result<(), EmitterError> {
        for preset in &self.emitters {
            preset.config.validate().map_err(|e| EmitterError::Preset {
                name: preset.name.clone(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EmitterPreset> {
        self.emitters.iter().find(|p| p.name == name)
    }
}
