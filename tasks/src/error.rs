//! Task errors.
//!
//! A [`Rejection`] is a policy outcome: the response was well-formed but not
//! acceptable, and a corrected response may still succeed. A
//! [`ContractViolation`] means the caller used the API wrongly; retrying the
//! same call can never succeed.

use thiserror::Error;
use trappist_codec::CodecError;
use trappist_types::{BlockNumber, OperatorId, TaskIndex};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StaleReason {
    #[error("task is already resolved")]
    AlreadyResolved,

    #[error("payload differs from the recorded task")]
    PayloadMismatch,

    #[error("creation block {claimed} differs from recorded {recorded}")]
    CreationBlockMismatch {
        recorded: BlockNumber,
        claimed: BlockNumber,
    },

    #[error("signatures reference block {reference}, task was created at {recorded}")]
    ReferenceBlockMismatch {
        recorded: BlockNumber,
        reference: BlockNumber,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("task {index}: {reason}")]
    StaleOrMismatchedTask { index: TaskIndex, reason: StaleReason },

    #[error("operator {0} appears more than once")]
    DuplicateOperator(OperatorId),

    #[error("invalid signature from operator {0}")]
    InvalidSignature(OperatorId),

    #[error("operator {0} is not registered")]
    UnregisteredOperator(OperatorId),

    #[error("insufficient stake: signed {signed}, required {required} of {total}")]
    InsufficientStake {
        signed: u128,
        required: u128,
        total: u128,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("task {0} was never created")]
    UnknownTask(TaskIndex),

    #[error(transparent)]
    MalformedResponse(#[from] CodecError),

    #[error("task index space exhausted")]
    IndexSpaceExhausted,

    #[error("payload is {len} bytes, the limit is {max}")]
    PayloadTooLarge { len: usize, max: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("response rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    /// The verification worker was shut down before it returned.
    #[error("response verification was cancelled")]
    Cancelled,
}

impl TaskError {
    /// Whether a different response to the same call could still succeed.
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, TaskError::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            TaskError::Rejected(r) => Some(r),
            TaskError::Contract(_) | TaskError::Cancelled => None,
        }
    }
}

impl From<CodecError> for TaskError {
    fn from(e: CodecError) -> Self {
        TaskError::Contract(ContractViolation::MalformedResponse(e))
    }
}
