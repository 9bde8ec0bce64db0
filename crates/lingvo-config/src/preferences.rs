//! Reader state that survives restarts: UI language, playback rate, chosen
//! voice and which prompts were dismissed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::{ConfigError, config_dir};

const PREFERENCES_FILE: &str = "preferences.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub ui_language: String,
    pub speech_rate: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
    pub dismissed_prompts: BTreeSet<String>,
    /// The reader asked to be sent to an external browser for speech.
    pub open_externally: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            ui_language: "en".to_string(),
            speech_rate: 1.0,
            voice_name: None,
            dismissed_prompts: BTreeSet::new(),
            open_externally: false,
        }
    }
}

impl Preferences {
    /// Defaults when the file does not exist yet.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
                config_path: path.to_path_buf(),
                source,
            })?;

        toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: path.to_path_buf(),
            source,
        })
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Self::path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::path())
    }

    pub fn path() -> PathBuf {
        config_dir().join(PREFERENCES_FILE)
    }

    pub fn is_dismissed(&self, prompt: &str) -> bool {
        self.dismissed_prompts.contains(prompt)
    }

    /// Returns false if the prompt was already dismissed.
    pub fn dismiss(&mut self, prompt: impl Into<String>) -> bool {
        self.dismissed_prompts.insert(prompt.into())
    }
}
