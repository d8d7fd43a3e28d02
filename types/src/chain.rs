//! Block references and the read-only view of the external ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::Timestamp;

/// Height of a block on the external ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockNumber(u64);

impl BlockNumber {
    pub const GENESIS: Self = Self(0);

    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the core needs to know about the ledger it runs against.
///
/// Reads are assumed consistent for the duration of one call.
pub trait ChainView: Send + Sync {
    /// Height of the current block.
    fn block_number(&self) -> BlockNumber;

    /// Timestamp of the current block.
    fn timestamp(&self) -> Timestamp;
}
