use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::triage::blood_pressure::BpRuleSet;
use crate::triage::cardiac::AnginaCoding;

/// Application-level constants
pub const APP_NAME: &str = "Triageon";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the engine settings file inside [`app_config_dir`].
pub const ENGINE_CONFIG_FILE: &str = "engine.json";

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "triageon_lib=info"
}

/// Per-user configuration directory, e.g. `~/.config/Triageon` on Linux.
/// `None` when the platform has no config directory.
pub fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

// ═══════════════════════════════════════════════════════════
// Engine configuration
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Blood pressure staging table.
    pub bp_rule_set: BpRuleSet,
    /// Chest pain code treated as "no chest pain" for cardiac subtyping.
    pub angina_coding: AnginaCoding,
    /// Reject out-of-range BP, diabetes and cardiac readings instead of
    /// flagging them. Temperature is always strict.
    pub strict_ranges: bool,
    /// Overrides [`default_log_filter`] when set; `RUST_LOG` still wins.
    pub log_filter: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bp_rule_set: BpRuleSet::Category,
            angina_coding: AnginaCoding::Recorded,
            strict_ranges: false,
            log_filter: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, or return defaults when the file does not exist.
    pub fn load_or_default_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No engine config file, using defaults");
            return Ok(Self::default());
        }
        let config = Self::load(path)?;
        tracing::info!(path = %path.display(), "Engine config loaded");
        Ok(config)
    }

    /// Load `<config dir>/Triageon/engine.json`, falling back to defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match app_config_dir() {
            Some(dir) => Self::load_or_default_from(&dir.join(ENGINE_CONFIG_FILE)),
            None => {
                tracing::warn!("No platform config directory, using default engine config");
                Ok(Self::default())
            }
        }
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(default_log_filter())
    }
}
