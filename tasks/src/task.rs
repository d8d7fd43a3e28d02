//! Task records.

use serde::{Deserialize, Serialize};
use trappist_codec::task_digest;
use trappist_types::{BlockNumber, Digest, TaskIndex};

/// A task as created. Never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub index: TaskIndex,
    pub payload: String,
    pub created_block: BlockNumber,
}

impl Task {
    /// The digest operators sign for this task.
    pub fn digest(&self) -> Digest {
        task_digest(self.index, &self.payload, self.created_block)
    }
}

/// Lifecycle: `Created` until the first accepted response, then `Resolved` for good.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Created,
    Resolved,
}
