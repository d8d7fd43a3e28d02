//! Simulated ledger for the devnet: one block every `block_time_secs`.

use std::sync::atomic::{AtomicU64, Ordering};
use trappist_types::{BlockNumber, ChainView, Timestamp};

pub struct DevChain {
    block: AtomicU64,
    time: AtomicU64,
    block_time_secs: u64,
}

impl DevChain {
    /// Start at block 1, stamped with the current wall-clock time.
    pub fn new(block_time_secs: u64) -> Self {
        Self {
            block: AtomicU64::new(1),
            time: AtomicU64::new(Timestamp::now().as_secs()),
            block_time_secs,
        }
    }

    pub fn block_time_secs(&self) -> u64 {
        self.block_time_secs
    }

    /// Produce the next block and return its height.
    pub fn mine(&self) -> BlockNumber {
        self.time.fetch_add(self.block_time_secs, Ordering::SeqCst);
        BlockNumber::new(self.block.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl ChainView for DevChain {
    fn block_number(&self) -> BlockNumber {
        BlockNumber::new(self.block.load(Ordering::SeqCst))
    }

    fn timestamp(&self) -> Timestamp {
        Timestamp::new(self.time.load(Ordering::SeqCst))
    }
}
