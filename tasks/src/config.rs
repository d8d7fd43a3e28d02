//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use trappist_quorum::{Quorum, QuorumError, QuorumPolicy, StrategyParams};
use trappist_utils::LogFormat;

use crate::manager::ManagerOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Quorum(#[from] QuorumError),
}

/// One `[[strategies]]` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub strategy: String,
    #[serde(default = "default_multiplier")]
    pub multiplier: u64,
}

/// Configuration for one AVS instance.
///
/// Can be loaded from a TOML file via [`AvsConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvsConfig {
    /// Hashed into the service id that registrations are bound to.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default)]
    pub quorum_number: u8,

    /// Acceptance threshold in basis points of total registered weight.
    #[serde(default = "default_threshold_bps")]
    pub threshold_bps: u32,

    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyConfig>,

    /// Weight an operator needs to register.
    #[serde(default)]
    pub minimum_stake: u64,

    #[serde(default = "default_max_response_operators")]
    pub max_response_operators: usize,

    /// Longest task payload `create_task` accepts, in bytes.
    #[serde(default = "default_max_payload_len")]
    pub max_payload_len: usize,

    #[serde(default = "default_true")]
    pub parallel_verification: bool,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_service_name() -> String {
    "trappist".to_string()
}

fn default_threshold_bps() -> u32 {
    6_600
}

fn default_multiplier() -> u64 {
    1
}

fn default_strategies() -> Vec<StrategyConfig> {
    vec![StrategyConfig {
        strategy: "beacon-eth".to_string(),
        multiplier: default_multiplier(),
    }]
}

fn default_max_response_operators() -> usize {
    256
}

fn default_max_payload_len() -> usize {
    64 * 1024
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AvsConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::Invalid("service_name is empty".into()));
        }
        if self.max_response_operators == 0 {
            return Err(ConfigError::Invalid(
                "max_response_operators must be at least 1".into(),
            ));
        }
        if self.max_payload_len == 0 || u32::try_from(self.max_payload_len).is_err() {
            return Err(ConfigError::Invalid(
                "max_payload_len must be between 1 and u32::MAX".into(),
            ));
        }
        self.build_policy()?;
        self.build_quorum()?;
        Ok(())
    }

    pub fn build_quorum(&self) -> Result<Quorum, ConfigError> {
        let strategies = self
            .strategies
            .iter()
            .map(|s| StrategyParams::new(s.strategy.as_str(), u128::from(s.multiplier)))
            .collect();
        Ok(Quorum::new(
            self.quorum_number,
            strategies,
            u128::from(self.minimum_stake),
        )?)
    }

    pub fn build_policy(&self) -> Result<QuorumPolicy, ConfigError> {
        Ok(QuorumPolicy::new(self.threshold_bps)?)
    }

    pub fn manager_options(&self) -> ManagerOptions {
        ManagerOptions {
            max_response_operators: self.max_response_operators,
            max_payload_len: self.max_payload_len,
            parallel_verification: self.parallel_verification,
        }
    }
}

impl Default for AvsConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            quorum_number: 0,
            threshold_bps: default_threshold_bps(),
            strategies: default_strategies(),
            minimum_stake: 0,
            max_response_operators: default_max_response_operators(),
            max_payload_len: default_max_payload_len(),
            parallel_verification: default_true(),
            log_format: LogFormat::Human,
            log_level: default_log_level(),
        }
    }
}
