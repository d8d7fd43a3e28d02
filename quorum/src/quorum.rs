//! Quorum definition: the ordered strategy list and its multipliers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use trappist_types::StrategyId;

use crate::QuorumError;

/// One strategy counted by a quorum and the multiplier applied to its shares.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub strategy: StrategyId,
    pub multiplier: u128,
}

impl StrategyParams {
    pub fn new(strategy: impl Into<StrategyId>, multiplier: u128) -> Self {
        Self {
            strategy: strategy.into(),
            multiplier,
        }
    }
}

/// A validated quorum.
///
/// Strategy order is preserved as configured, so the weight sum is computed
/// in the same order on every node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quorum {
    number: u8,
    strategies: Vec<StrategyParams>,
    minimum_stake: u128,
}

impl Quorum {
    pub fn new(
        number: u8,
        strategies: Vec<StrategyParams>,
        minimum_stake: u128,
    ) -> Result<Self, QuorumError> {
        if strategies.is_empty() {
            return Err(QuorumError::NoStrategies(number));
        }
        let mut seen = HashSet::new();
        for params in &strategies {
            if params.multiplier == 0 {
                return Err(QuorumError::ZeroMultiplier(params.strategy.to_string()));
            }
            if !seen.insert(&params.strategy) {
                return Err(QuorumError::DuplicateStrategy(params.strategy.to_string()));
            }
        }
        Ok(Self {
            number,
            strategies,
            minimum_stake,
        })
    }

    /// Quorum counting a single strategy at multiplier 1.
    pub fn single(number: u8, strategy: impl Into<StrategyId>) -> Self {
        Self {
            number,
            strategies: vec![StrategyParams::new(strategy, 1)],
            minimum_stake: 0,
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn strategies(&self) -> &[StrategyParams] {
        &self.strategies
    }

    /// Minimum weight an operator needs to join.
    pub fn minimum_stake(&self) -> u128 {
        self.minimum_stake
    }

    /// Weight of one operator: Σ shares × multiplier over the quorum's
    /// strategies, saturating at `u128::MAX`.
    pub fn weight(&self, shares: impl Fn(&StrategyId) -> u128) -> u128 {
        self.strategies.iter().fold(0u128, |acc, params| {
            acc.saturating_add(shares(&params.strategy).saturating_mul(params.multiplier))
        })
    }
}
