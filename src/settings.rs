//! Runtime settings
//!
//! Read from an optional JSON file; any field left out takes its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::LOGIC_HZ;

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Settings for running a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Logic ticks per second
    pub logic_hz: u32,
    /// Simulated display refresh rate of the headless runner
    pub display_hz: u32,
    /// Log an ASCII frame every this many logic ticks (0 disables)
    pub render_every: u64,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
    /// Seed for the autopilot
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logic_hz: LOGIC_HZ,
            display_hz: 60,
            render_every: 30,
            log_filter: None,
            seed: 0,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=1000).contains(&self.logic_hz) {
            return Err(SettingsError::Invalid {
                field: "logic_hz",
                reason: format!("{} is outside 1..=1000", self.logic_hz),
            });
        }
        if !(1..=1000).contains(&self.display_hz) {
            return Err(SettingsError::Invalid {
                field: "display_hz",
                reason: format!("{} is outside 1..=1000", self.display_hz),
            });
        }
        if self.log_filter.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(SettingsError::Invalid {
                field: "log_filter",
                reason: "empty filter".to_string(),
            });
        }
        Ok(())
    }
}
