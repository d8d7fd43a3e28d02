//! Signing key material and signatures.

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::operator::OperatorId;

/// A 32-byte Ed25519 secret seed.
///
/// Deliberately not `Debug`, `Clone` or `Serialize`; the bytes are wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

/// An operator's signing key together with the identity it proves.
///
/// Construct through `trappist_crypto::generate_keypair` or `keypair_from_seed`.
pub struct KeyPair {
    pub public: OperatorId,
    pub private: PrivateKey,
}

/// A 64-byte Ed25519 signature (`R || S`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{}\u{2026})", hex::encode(&self.0[..8]))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

struct SignatureBytes;

impl<'de> Visitor<'de> for SignatureBytes {
    type Value = Signature;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a 64-byte signature")
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Signature, E> {
        <[u8; 64]>::try_from(v)
            .map(Signature)
            .map_err(|_| E::invalid_length(v.len(), &self))
    }

    // Human-readable formats (JSON) hand byte strings over as sequences.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Signature, A::Error> {
        let mut out = [0u8; 64];
        let mut filled = 0;
        while let Some(byte) = seq.next_element::<u8>()? {
            if filled == out.len() {
                return Err(de::Error::invalid_length(filled + 1, &self));
            }
            out[filled] = byte;
            filled += 1;
        }
        if filled != out.len() {
            return Err(de::Error::invalid_length(filled, &self));
        }
        Ok(Signature(out))
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_bytes(SignatureBytes)
    }
}
