//! Configuration persistence for the trainer.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration that persists between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The currently selected theme name.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Cards per group.
    #[serde(default = "default_group_size")]
    pub group_size: usize,

    /// Deck file to study. The bundled deck is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<PathBuf>,

    /// Most times one card may be shown in a sitting. Unlimited when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_presentations: Option<u32>,

    /// Log filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "slate".to_string()
}

fn default_group_size() -> usize {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            group_size: default_group_size(),
            deck: None,
            max_presentations: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flashgroup")
            .join("config.toml")
    }

    /// Load config from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from disk, returning default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.group_size == 0 {
            bail!("group_size must be at least 1");
        }
        if self.max_presentations == Some(0) {
            bail!("max_presentations must be at least 1 when set");
        }
        Ok(())
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save config to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Write only `theme` back to the file at `path`.
    ///
    /// Everything else is re-read from disk, so command line overrides
    /// held in memory never reach the file.
    pub fn persist_theme(path: &Path, theme: &str) -> Result<()> {
        let mut on_disk = Self::load_from(path)?;
        on_disk.theme = theme.to_string();
        on_disk.save_to(path)
    }
}
