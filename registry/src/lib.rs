//! Operator registry.
//!
//! Tracks which identities are registered operators of this service. Stake
//! itself lives on the external staking ledger and is read live through the
//! [`StakeLedger`] capability, so weights always reflect the ledger as of
//! the call that reads them.
//!
//! - [`ledger`]: the ledger capability, its update records, and an in-memory implementation.
//! - [`registry`]: signed registration with salt/expiry replay protection, deregistration.
//! - [`error`]: registration failures.

pub mod error;
pub mod ledger;
pub mod registry;

pub use error::RegistryError;
pub use ledger::{InMemoryStakeLedger, LedgerEvent, StakeChange, StakeLedger, StakeUpdate};
pub use registry::{OperatorRecord, OperatorRegistry, OperatorStatus, RegistrationRequest};
