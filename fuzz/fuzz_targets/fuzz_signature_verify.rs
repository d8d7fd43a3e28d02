#![no_main]

use libfuzzer_sys::fuzz_target;
use trappist_crypto::{Ed25519Verifier, SignatureVerifier};
use trappist_types::{Digest, OperatorId, Signature};

// Arbitrary keys and signatures must be rejected or accepted, never panic.
fuzz_target!(|data: [u8; 128]| {
    let mut digest = [0u8; 32];
    let mut key = [0u8; 32];
    let mut sig = [0u8; 64];
    digest.copy_from_slice(&data[..32]);
    key.copy_from_slice(&data[32..64]);
    sig.copy_from_slice(&data[64..]);

    let claimed = OperatorId::new(key);
    if let Ok(verified) = Ed25519Verifier.verify(&Digest::new(digest), &claimed, &Signature(sig)) {
        assert_eq!(verified, claimed);
    }
});
