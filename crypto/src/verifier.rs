//! The signature-verifier seam.
//!
//! The task manager and the operator registry never call Ed25519 directly;
//! they hold an `Arc<dyn SignatureVerifier>` so the scheme can be swapped
//! without touching either of them.

use trappist_types::{Digest, OperatorId, Signature};

use crate::sign::verify_signature;
use crate::SignatureError;

/// Checks that `signature` over `digest` was produced by `claimed` and
/// returns the verified identity.
pub trait SignatureVerifier: Send + Sync {
    fn verify(
        &self,
        digest: &Digest,
        claimed: &OperatorId,
        signature: &Signature,
    ) -> Result<OperatorId, SignatureError>;
}

/// Strict Ed25519 verification.
///
/// Ed25519 has no public-key recovery, so the identity claimed alongside the
/// signature is the verification key. A malformed key, a signature by some
/// other key, and a malleated signature all fail.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        digest: &Digest,
        claimed: &OperatorId,
        signature: &Signature,
    ) -> Result<OperatorId, SignatureError> {
        verify_signature(digest.as_bytes(), signature, claimed)?;
        Ok(*claimed)
    }
}
