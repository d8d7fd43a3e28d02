#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use trappist_codec::task_digest;
use trappist_types::{BlockNumber, TaskIndex};

#[derive(Debug, Arbitrary)]
struct Input {
    index: u32,
    split: usize,
    payload: String,
    block: u64,
}

// Moving bytes between the payload and a neighbouring field must change the
// digest: the length prefix keeps field boundaries unambiguous.
fuzz_target!(|input: Input| {
    let digest = task_digest(
        TaskIndex::new(input.index),
        &input.payload,
        BlockNumber::new(input.block),
    );
    assert_eq!(
        digest,
        task_digest(
            TaskIndex::new(input.index),
            &input.payload,
            BlockNumber::new(input.block)
        )
    );

    if input.payload.is_empty() {
        return;
    }
    let mut cut = input.split % input.payload.len();
    while !input.payload.is_char_boundary(cut) {
        cut -= 1;
    }
    let shorter = &input.payload[..cut];
    assert_ne!(
        digest,
        task_digest(TaskIndex::new(input.index), shorter, BlockNumber::new(input.block))
    );
});
