//! Ed25519 operator keys.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use trappist_types::{KeyPair, OperatorId, PrivateKey};

/// Generate a fresh operator key pair from the OS random source.
pub fn generate_keypair() -> KeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    KeyPair {
        public: OperatorId::new(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// The identity a private key proves.
pub fn operator_id_from_private(private: &PrivateKey) -> OperatorId {
    let signing_key = SigningKey::from_bytes(&private.0);
    OperatorId::new(signing_key.verifying_key().to_bytes())
}

/// Rebuild a key pair around an existing private key.
pub fn keypair_from_private(private: PrivateKey) -> KeyPair {
    let public = operator_id_from_private(&private);
    KeyPair { public, private }
}

/// Deterministic key pair from a 32-byte seed. Used for dev operators and tests.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    keypair_from_private(PrivateKey(*seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_distinct_keys() {
        let a = generate_keypair();
        let b = generate_keypair();
        assert_ne!(a.public, b.public);
    }

    #[test]
    fn public_matches_private() {
        let kp = generate_keypair();
        assert_eq!(operator_id_from_private(&kp.private), kp.public);
    }

    #[test]
    fn seed_is_deterministic() {
        let a = keypair_from_seed(&[42u8; 32]);
        let b = keypair_from_seed(&[42u8; 32]);
        assert_eq!(a.public, b.public);
        assert_eq!(a.private.0, b.private.0);
    }

    #[test]
    fn different_seeds_differ() {
        assert_ne!(
            keypair_from_seed(&[1u8; 32]).public,
            keypair_from_seed(&[2u8; 32]).public
        );
    }
}
