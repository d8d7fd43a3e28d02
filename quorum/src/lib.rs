//! Quorum policy.
//!
//! - [`Quorum`]: which strategies count toward an operator's weight, and with
//!   what multiplier.
//! - [`QuorumPolicy`]: the fraction of total weight (in basis points) a
//!   response must carry to be accepted. Pure integer arithmetic throughout.
//! - [`StakeView`]: read access to per-operator and total weight, implemented
//!   by the operator registry.

pub mod error;
pub mod policy;
pub mod quorum;

pub use error::QuorumError;
pub use policy::{QuorumPolicy, Tally, BPS_DENOMINATOR};
pub use quorum::{Quorum, StrategyParams};

use trappist_types::OperatorId;

/// Read-only weights for one quorum, as of the current ledger state.
pub trait StakeView {
    /// Weight of `operator`; zero for anything not currently registered.
    fn weight_of(&self, operator: &OperatorId) -> u128;

    /// Sum of the weights of all registered operators.
    fn total_weight(&self) -> u128;
}
