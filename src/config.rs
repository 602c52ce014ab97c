//! Runtime configuration from environment variables

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const STATE_DIR_ENV: &str = "CBMPE_STATE_DIR";
pub const TYPING_DELAY_ENV: &str = "CBMPE_TYPING_DELAY_MS";
pub const PROCESSING_DELAY_ENV: &str = "CBMPE_PROCESSING_DELAY_MS";
pub const PROTOCOL_SEED_ENV: &str = "CBMPE_PROTOCOL_SEED";

const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(1200);
const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Holds the last-screen file and the log
    pub state_dir: PathBuf,
    pub typing_delay: Duration,
    pub processing_delay: Duration,
    /// Fixed seed for reproducible protocol numbers
    pub protocol_seed: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let state_dir = lookup(STATE_DIR_ENV).map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".cbmpe-assistant")
            },
            PathBuf::from,
        );

        Ok(Self {
            state_dir,
            typing_delay: millis(&lookup, TYPING_DELAY_ENV)?.unwrap_or(DEFAULT_TYPING_DELAY),
            processing_delay: millis(&lookup, PROCESSING_DELAY_ENV)?
                .unwrap_or(DEFAULT_PROCESSING_DELAY),
            protocol_seed: number(&lookup, PROTOCOL_SEED_ENV)?,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("cbmpe-assistant.log")
    }
}

fn number(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    Ok(number(lookup, var)?.map(Duration::from_millis))
}
