//! Fundamental types for the Trappist AVS.
//!
//! This crate defines the data model shared by every other crate in the workspace:
//! operator identities, keys and signatures, digests, task indices, block numbers,
//! staking strategies, and the events the service emits to off-chain watchers.

pub mod chain;
pub mod digest;
pub mod error;
pub mod event;
pub mod keys;
pub mod operator;
pub mod strategy;
pub mod task;
pub mod time;

pub use chain::{BlockNumber, ChainView};
pub use digest::Digest;
pub use error::ParseIdError;
pub use event::{AvsEvent, EventBus, EventSink};
pub use keys::{KeyPair, PrivateKey, Signature};
pub use operator::{OperatorId, Salt, ServiceId};
pub use strategy::StrategyId;
pub use task::TaskIndex;
pub use time::Timestamp;
