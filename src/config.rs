//! Runtime configuration, loaded from an optional TOML file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::session::TransactionPin;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("tick interval must be greater than zero")]
    ZeroTick,
}

/// Order of the outcome decision and the balance update on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementOrder {
    /// Show the outcome, then record the balance update; a failed update is
    /// only logged.
    #[default]
    OutcomeFirst,
    /// Record the balance update before deciding; a failed update fails the run.
    RecordFirst,
}

/// Timing of the simulated processing delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Interval between progress ticks.
    pub tick_ms: u64,
    /// Pause between reaching 100% and showing the outcome.
    pub settle_ms: u64,
}

impl Timing {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_ms: 1_000,
            settle_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transaction_pin: String,
    pub timing: Timing,
    pub settlement: SettlementOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transaction_pin: "112233".to_string(),
            timing: Timing::default(),
            settlement: SettlementOrder::default(),
        }
    }
}

impl Config {
    pub fn from_toml(source: &str, path: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        if config.timing.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml(&source, &display)
    }

    pub fn transaction_pin(&self) -> TransactionPin {
        TransactionPin::new(self.transaction_pin.clone())
    }
}
