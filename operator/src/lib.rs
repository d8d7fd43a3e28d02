//! Off-chain side of the Trappist AVS.
//!
//! Operators watch for new tasks, sign the task digest with their key and
//! hand the signature to an aggregator. The aggregator packs the signatures
//! into a response blob and submits it to the service.

pub mod aggregator;
pub mod error;
pub mod names;
pub mod signer;

pub use aggregator::ResponseAggregator;
pub use error::AggregatorError;
pub use names::generate_random_name;
pub use signer::{random_salt, OperatorSigner};
