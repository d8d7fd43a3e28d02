//! Ed25519 signing and strict verification.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use trappist_types::{Digest, OperatorId, PrivateKey, Signature};

use crate::SignatureError;

fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    Signature(signing_key.sign(message).to_bytes())
}

/// Sign a codec digest. Operators sign the 32 digest bytes, never the raw fields.
pub fn sign_digest(digest: &Digest, private_key: &PrivateKey) -> Signature {
    sign_message(digest.as_bytes(), private_key)
}

/// Verify a signature against a message and the signer's identity.
///
/// Uses strict verification: non-canonical `S` or `R` encodings and
/// small-order keys are rejected rather than normalised.
pub fn verify_signature(
    message: &[u8],
    signature: &Signature,
    signer: &OperatorId,
) -> Result<(), SignatureError> {
    let verifying_key = VerifyingKey::from_bytes(signer.as_bytes())
        .map_err(|_| SignatureError::MalformedKey(signer.to_string()))?;
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key
        .verify_strict(message, &dalek_sig)
        .map_err(|_| SignatureError::Invalid(signer.to_string()))
}
