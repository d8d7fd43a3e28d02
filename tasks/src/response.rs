//! The persisted form of an accepted response.

use serde::{Deserialize, Serialize};
use trappist_types::{BlockNumber, Digest, OperatorId, Signature, TaskIndex};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedResponse {
    pub index: TaskIndex,
    pub task_digest: Digest,
    pub response_digest: Digest,
    pub operators: Vec<OperatorId>,
    pub signatures: Vec<Signature>,
    pub reference_block: BlockNumber,
    /// Weight of the signers as read at verification time.
    pub signed_weight: u128,
    pub total_weight: u128,
    pub required_weight: u128,
    pub resolved_at: BlockNumber,
}
