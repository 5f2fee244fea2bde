//! Persistent user settings.
//!
//! Stored as JSON under the platform config directory. API credentials fall
//! back to environment variables so the CLI works in scripts without a
//! settings file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::filter::JunkFilter;

pub const ASSEMBLYAI_KEY_ENV: &str = "ASSEMBLYAI_API_KEY";
pub const PANTRY_ID_ENV: &str = "PANTRY_ID";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// AssemblyAI API key.
    #[serde(default)]
    pub assemblyai_api_key: Option<String>,

    /// Pantry Cloud pantry id for the backup basket.
    #[serde(default)]
    pub pantry_id: Option<String>,

    /// Language code passed to the transcription vendor.
    #[serde(default = "default_language")]
    pub language: String,

    /// Override for the junk-phrase list (None = built-in defaults).
    #[serde(default)]
    pub junk_phrases: Option<Vec<String>>,
}

fn default_language() -> String {
    "pl".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assemblyai_api_key: None,
            pantry_id: None,
            language: default_language(),
            junk_phrases: None,
        }
    }
}

impl Settings {
    pub fn path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("lasto")
            .join("settings.json"))
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load() -> Self {
        let Ok(path) = Self::path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|err| {
                crate::verbose!("Settings file unreadable, using defaults: {err}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// AssemblyAI API key from settings, falling back to the environment.
    pub fn api_key(&self) -> Option<String> {
        self.assemblyai_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(ASSEMBLYAI_KEY_ENV).ok())
    }

    /// Pantry id from settings, falling back to the environment. Trimmed,
    /// since the id is usually pasted from the Pantry dashboard.
    pub fn pantry_id(&self) -> Option<String> {
        self.pantry_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| std::env::var(PANTRY_ID_ENV).ok())
            .map(|id| id.trim().to_string())
    }

    /// Build the junk filter from the configured phrase list.
    pub fn junk_filter(&self) -> JunkFilter {
        match &self.junk_phrases {
            Some(phrases) => JunkFilter::new(phrases.clone()),
            None => JunkFilter::default(),
        }
    }
}
