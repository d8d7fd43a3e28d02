use thiserror::Error;
use trappist_types::{OperatorId, TaskIndex};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("signature from {0} does not verify against the task digest")]
    InvalidSignature(OperatorId),

    #[error("no signatures collected for task {0}")]
    Empty(TaskIndex),
}
