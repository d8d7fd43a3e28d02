//! Cryptographic primitives for the Trappist AVS.
//!
//! - **Ed25519** for operator signatures, verified strictly (no malleable encodings)
//! - **Blake2b-256** for every digest the protocol signs
//! - [`SignatureVerifier`], the seam the task manager and registry verify through

pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;
pub mod verifier;

pub use error::SignatureError;
pub use hash::{blake2b_256, blake2b_256_multi, service_id};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, operator_id_from_private};
pub use sign::{sign_digest, verify_signature};
pub use verifier::{Ed25519Verifier, SignatureVerifier};
