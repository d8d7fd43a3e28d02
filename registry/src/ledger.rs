//! The external staking ledger, as seen by the registry.
//!
//! The ledger is the source of truth for who is an operator of the restaking
//! framework and how many shares each operator holds per strategy. The core
//! only reads it; updates arrive as [`StakeUpdate`] records and are applied by
//! whoever owns the ledger.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};
use trappist_types::{OperatorId, StrategyId};

/// Read capability over the external staking ledger.
pub trait StakeLedger: Send + Sync {
    /// Whether `operator` has signed up with the restaking framework.
    fn is_operator(&self, operator: &OperatorId) -> bool;

    /// Shares `operator` currently holds in `strategy`.
    fn shares(&self, operator: &OperatorId, strategy: &StrategyId) -> u128;
}

/// How a stake record changes an operator's shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeChange {
    /// Signed adjustment; a result below zero clamps to zero.
    Delta(i128),
    /// Replace the current value.
    Absolute(u128),
}

/// `(identity, weightDelta | absoluteWeight)` record from the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeUpdate {
    pub operator: OperatorId,
    pub strategy: StrategyId,
    pub change: StakeChange,
}

/// Ledger-side events that change registration status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// The operator left the restaking framework or was ejected from this service.
    OperatorExited { operator: OperatorId },
}

/// In-memory ledger cache fed by [`StakeUpdate`] records.
///
/// Used by the devnet and by tests; a production deployment would implement
/// [`StakeLedger`] over its chain client instead.
#[derive(Default)]
pub struct InMemoryStakeLedger {
    operators: RwLock<HashSet<OperatorId>>,
    shares: RwLock<HashMap<(OperatorId, StrategyId), u128>>,
}

impl InMemoryStakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `operator` signed up with the restaking framework.
    pub fn add_operator(&self, operator: OperatorId) {
        self.operators
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operator);
    }

    pub fn remove_operator(&self, operator: &OperatorId) {
        self.operators
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(operator);
    }

    /// Apply one stake record, returning the operator's new share count.
    pub fn apply(&self, update: &StakeUpdate) -> u128 {
        let mut shares = self.shares.write().unwrap_or_else(PoisonError::into_inner);
        let key = (update.operator, update.strategy.clone());
        let current = shares.get(&key).copied().unwrap_or(0);
        let next = match update.change {
            StakeChange::Absolute(value) => value,
            StakeChange::Delta(delta) if delta >= 0 => current.saturating_add(delta.unsigned_abs()),
            StakeChange::Delta(delta) => current.saturating_sub(delta.unsigned_abs()),
        };
        if next == 0 {
            shares.remove(&key);
        } else {
            shares.insert(key, next);
        }
        next
    }

    /// Convenience for `apply` with an absolute value.
    pub fn set_shares(&self, operator: OperatorId, strategy: impl Into<StrategyId>, value: u128) {
        self.apply(&StakeUpdate {
            operator,
            strategy: strategy.into(),
            change: StakeChange::Absolute(value),
        });
    }
}

impl StakeLedger for InMemoryStakeLedger {
    fn is_operator(&self, operator: &OperatorId) -> bool {
        self.operators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(operator)
    }

    fn shares(&self, operator: &OperatorId, strategy: &StrategyId) -> u128 {
        self.shares
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(*operator, strategy.clone()))
            .copied()
            .unwrap_or(0)
    }
}
