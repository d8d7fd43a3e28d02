//! An operator's signing identity.

use rand::{CryptoRng, RngCore};
use trappist_codec::{registration_digest, task_digest};
use trappist_crypto::{generate_keypair, keypair_from_seed, sign_digest};
use trappist_registry::RegistrationRequest;
use trappist_types::{BlockNumber, Digest, KeyPair, OperatorId, Salt, ServiceId, Signature, TaskIndex, Timestamp};

/// Holds one operator key and produces every signature the operator needs.
pub struct OperatorSigner {
    keypair: KeyPair,
}

impl OperatorSigner {
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    pub fn generate() -> Self {
        Self::new(generate_keypair())
    }

    /// Deterministic signer for dev operators.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::new(keypair_from_seed(seed))
    }

    pub fn id(&self) -> OperatorId {
        self.keypair.public
    }

    /// Sign the digest of the task `(index, payload, block)`.
    pub fn sign_task(&self, index: TaskIndex, payload: &str, block: BlockNumber) -> Signature {
        self.sign(&task_digest(index, payload, block))
    }

    pub fn sign(&self, digest: &Digest) -> Signature {
        sign_digest(digest, &self.keypair.private)
    }

    /// Signed attestation binding this operator to `service` until `expiry`.
    pub fn registration_request(
        &self,
        service: &ServiceId,
        salt: Salt,
        expiry: Timestamp,
    ) -> RegistrationRequest {
        let digest = registration_digest(service, &self.keypair.public, &salt, expiry);
        RegistrationRequest {
            operator: self.keypair.public,
            signature: self.sign(&digest),
            salt,
            expiry,
        }
    }
}

/// Fresh registration salt.
pub fn random_salt(rng: &mut (impl RngCore + CryptoRng)) -> Salt {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    Salt(bytes)
}
