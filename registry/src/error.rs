use thiserror::Error;
use trappist_types::{OperatorId, Salt, Timestamp};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registration for {operator} expired at {expiry} (now {now})")]
    RegistrationExpired {
        operator: OperatorId,
        expiry: Timestamp,
        now: Timestamp,
    },

    #[error("salt {salt} was already used by {operator}")]
    RegistrationReplay { operator: OperatorId, salt: Salt },

    #[error("registration signature from {0} is invalid")]
    InvalidSignature(OperatorId),

    #[error("operator {0} is already registered")]
    AlreadyRegistered(OperatorId),

    #[error("{0} is not an operator on the staking ledger")]
    NotLedgerOperator(OperatorId),

    #[error("operator {operator} has weight {weight}, quorum minimum is {minimum}")]
    InsufficientOperatorStake {
        operator: OperatorId,
        weight: u128,
        minimum: u128,
    },

    #[error("operator {0} is not registered")]
    NotRegistered(OperatorId),
}
