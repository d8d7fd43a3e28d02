//! Devnet configuration: the AVS settings plus the simulated environment.

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use trappist_crypto::blake2b_256;
use trappist_tasks::AvsConfig;

/// A dev operator: key derived from `seed`, `shares` in every quorum strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevOperator {
    pub seed: u64,
    pub shares: u64,
}

impl DevOperator {
    /// The 32-byte key seed this operator signs with.
    pub fn key_seed(&self) -> [u8; 32] {
        blake2b_256(&self.seed.to_be_bytes())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevnetConfig {
    /// Seconds between spammed tasks.
    #[serde(default = "default_task_interval_secs")]
    pub task_interval_secs: u64,

    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: u64,

    /// Seconds a registration attestation stays valid.
    #[serde(default = "default_registration_ttl_secs")]
    pub registration_ttl_secs: u64,

    /// Blocks after task creation that partial signature sets are kept
    /// while waiting for quorum.
    #[serde(default = "default_pending_ttl_blocks")]
    pub pending_ttl_blocks: u64,

    #[serde(default = "default_operators")]
    pub operators: Vec<DevOperator>,

    #[serde(default)]
    pub avs: AvsConfig,
}

fn default_task_interval_secs() -> u64 {
    15
}

fn default_block_time_secs() -> u64 {
    12
}

fn default_registration_ttl_secs() -> u64 {
    3_600
}

fn default_pending_ttl_blocks() -> u64 {
    32
}

fn default_operators() -> Vec<DevOperator> {
    vec![
        DevOperator { seed: 1, shares: 40 },
        DevOperator { seed: 2, shares: 30 },
        DevOperator { seed: 3, shares: 30 },
    ]
}

impl DevnetConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("parsing devnet config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.task_interval_secs > 0, "task_interval_secs must be positive");
        ensure!(self.block_time_secs > 0, "block_time_secs must be positive");
        ensure!(self.pending_ttl_blocks > 0, "pending_ttl_blocks must be positive");
        ensure!(!self.operators.is_empty(), "at least one dev operator is required");
        let mut seeds: Vec<_> = self.operators.iter().map(|o| o.seed).collect();
        seeds.sort_unstable();
        seeds.dedup();
        ensure!(seeds.len() == self.operators.len(), "dev operator seeds must be unique");
        self.avs.validate()?;
        Ok(())
    }
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            task_interval_secs: default_task_interval_secs(),
            block_time_secs: default_block_time_secs(),
            registration_ttl_secs: default_registration_ttl_secs(),
            pending_ttl_blocks: default_pending_ttl_blocks(),
            operators: default_operators(),
            avs: AvsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(DevnetConfig::from_toml_str("").unwrap(), DevnetConfig::default());
    }

    #[test]
    fn default_round_trips() {
        let text = DevnetConfig::default().to_toml_string().unwrap();
        assert_eq!(DevnetConfig::from_toml_str(&text).unwrap(), DevnetConfig::default());
    }

    #[test]
    fn nested_avs_table() {
        let config = DevnetConfig::from_toml_str(
            r#"
            task_interval_secs = 2

            [[operators]]
            seed = 9
            shares = 100

            [avs]
            threshold_bps = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.task_interval_secs, 2);
        assert_eq!(config.operators.len(), 1);
        assert_eq!(config.avs.threshold_bps, 5_000);
    }

    #[test]
    fn duplicate_seeds_are_rejected() {
        let text = r#"
            [[operators]]
            seed = 1
            shares = 1

            [[operators]]
            seed = 1
            shares = 2
        "#;
        assert!(DevnetConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(DevnetConfig::from_toml_str("task_interval_secs = 0").is_err());
        assert!(DevnetConfig::from_toml_str("pending_ttl_blocks = 0").is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devnet.toml");
        std::fs::write(&path, "block_time_secs = 3").unwrap();
        assert_eq!(DevnetConfig::from_toml_file(&path).unwrap().block_time_secs, 3);
    }

    #[test]
    fn key_seeds_differ() {
        let a = DevOperator { seed: 1, shares: 0 };
        let b = DevOperator { seed: 2, shares: 0 };
        assert_ne!(a.key_seed(), b.key_seed());
    }
}
