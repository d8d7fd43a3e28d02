//! Task lifecycle and quorum-signature verification.
//!
//! A task is created with the next sequential index and the current block.
//! Operators sign the task digest off-chain; a caller submits the aggregate
//! response, and the [`TaskManager`] accepts it only if every signature
//! verifies, every signer is registered, no signer repeats, and the signers'
//! combined weight reaches the quorum threshold.
//!
//! ## Module overview
//!
//! - [`task`]: task records and lifecycle status.
//! - [`manager`]: the state machine (`Created` → `Resolved`).
//! - [`response`]: what is persisted for an accepted response.
//! - [`service`]: thread-safe facade exposing the caller-facing operations.
//! - [`config`]: TOML configuration.
//! - [`error`]: policy rejections vs. contract violations.

pub mod config;
pub mod error;
pub mod manager;
pub mod response;
pub mod service;
pub mod task;

pub use config::{AvsConfig, ConfigError, StrategyConfig};
pub use error::{ContractViolation, Rejection, StaleReason, TaskError};
pub use manager::{ManagerOptions, TaskManager};
pub use response::AcceptedResponse;
pub use service::AvsService;
pub use task::{Task, TaskStatus};
