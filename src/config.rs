//! Engine configuration persistence
//!
//! Stores user preferences in `~/.config/vimkeys/config.yaml`:
//!
//! ```yaml
//! leader: ","
//! belloff: true
//! history: 100
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cmdline::DEFAULT_HISTORY_SIZE;

/// Engine configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Replaces `<leader>` in mapping files
    pub leader: String,

    /// Suppress blinks; messages are still shown
    pub belloff: bool,

    /// Entries kept per command-line history list
    #[serde(rename = "history")]
    pub history_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            leader: "\\".to_string(),
            belloff: false,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

impl EngineConfig {
    /// Load from the user config file, or defaults if there is none
    pub fn load() -> Self {
        match crate::config_paths::config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`; a missing or unreadable file gives defaults
    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(config)) => {
                tracing::info!("Loaded config from {}", path.display());
                config.normalized()
            }
            Ok(None) => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Option<Self>, String> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
        };
        // An empty file is a valid (all-default) config
        if content.trim().is_empty() {
            return Ok(Some(Self::default()));
        }
        serde_yaml::from_str(&content)
            .map(Some)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    /// Replace values the engine cannot use
    fn normalized(mut self) -> Self {
        if self.leader.is_empty() {
            tracing::warn!("Empty leader in config, using \\");
            self.leader = "\\".to_string();
        }
        self.history_size = self.history_size.max(1);
        self
    }

    /// Save to the user config file, creating its directory
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        std::fs::write(path, yaml)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
