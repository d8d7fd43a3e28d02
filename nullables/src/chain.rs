//! Nullable chain: block height and time advance only on request.

use std::sync::atomic::{AtomicU64, Ordering};
use trappist_types::{BlockNumber, ChainView, Timestamp};

pub struct NullChain {
    block: AtomicU64,
    time: AtomicU64,
}

impl NullChain {
    pub fn new(block: u64, time_secs: u64) -> Self {
        Self {
            block: AtomicU64::new(block),
            time: AtomicU64::new(time_secs),
        }
    }

    /// Mine `blocks` blocks, `secs_per_block` apart.
    pub fn advance_blocks(&self, blocks: u64, secs_per_block: u64) {
        self.block.fetch_add(blocks, Ordering::SeqCst);
        self.time
            .fetch_add(blocks.saturating_mul(secs_per_block), Ordering::SeqCst);
    }

    /// Move the clock without producing blocks.
    pub fn advance_time(&self, secs: u64) {
        self.time.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set_block(&self, block: u64) {
        self.block.store(block, Ordering::SeqCst);
    }

    pub fn set_time(&self, secs: u64) {
        self.time.store(secs, Ordering::SeqCst);
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl ChainView for NullChain {
    fn block_number(&self) -> BlockNumber {
        BlockNumber::new(self.block.load(Ordering::SeqCst))
    }

    fn timestamp(&self) -> Timestamp {
        Timestamp::new(self.time.load(Ordering::SeqCst))
    }
}
