//! The `responseBlob` wire format.
//!
//! bincode with fixed-width integers: each list carries a `u64` length prefix,
//! so the operator list, the signature list and the reference block decode
//! jointly without knowing the list lengths in advance.

use bincode::Options;
use serde::{Deserialize, Serialize};
use trappist_types::{BlockNumber, OperatorId, Signature};

use crate::CodecError;

/// Upper bound on an encoded blob, in bytes.
pub const MAX_BLOB_SIZE: u64 = 1024 * 1024;

/// An aggregate response as submitted by a caller: parallel operator and
/// signature lists plus the block at which off-chain signing happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBlob {
    pub operators: Vec<OperatorId>,
    pub signatures: Vec<Signature>,
    pub reference_block: BlockNumber,
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_BLOB_SIZE)
        .reject_trailing_bytes()
}

impl ResponseBlob {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        wire_options()
            .serialize(self)
            .map_err(|e| CodecError::Malformed(e.to_string()))
    }

    /// Decode and structurally validate a blob.
    ///
    /// `max_operators` bounds the signer list; the lists must be the same length.
    pub fn decode(bytes: &[u8], max_operators: usize) -> Result<Self, CodecError> {
        let blob: Self = wire_options()
            .deserialize(bytes)
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
        if blob.operators.len() != blob.signatures.len() {
            return Err(CodecError::LengthMismatch {
                operators: blob.operators.len(),
                signatures: blob.signatures.len(),
            });
        }
        if blob.operators.len() > max_operators {
            return Err(CodecError::TooManyOperators {
                count: blob.operators.len(),
                max: max_operators,
            });
        }
        Ok(blob)
    }

    /// `(operator, signature)` pairs in submission order.
    pub fn entries(&self) -> impl Iterator<Item = (&OperatorId, &Signature)> {
        self.operators.iter().zip(self.signatures.iter())
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(n: u8) -> ResponseBlob {
        ResponseBlob {
            operators: (0..n).map(|i| OperatorId::new([i; 32])).collect(),
            signatures: (0..n).map(|i| Signature([i; 64])).collect(),
            reference_block: BlockNumber::new(77),
        }
    }

    #[test]
    fn encode_decode() {
        let original = blob(3);
        let bytes = original.encode().unwrap();
        assert_eq!(ResponseBlob::decode(&bytes, 10).unwrap(), original);
    }

    #[test]
    fn layout_is_self_delimiting() {
        // u64 count + 32 per operator, u64 count + (u64 len + 64) per signature, u64 block.
        let bytes = blob(2).encode().unwrap();
        assert_eq!(bytes.len(), 8 + 2 * 32 + 8 + 2 * (8 + 64) + 8);
    }

    #[test]
    fn mismatched_lists_rejected() {
        let mut bad = blob(2);
        bad.signatures.pop();
        let bytes = bad.encode().unwrap();
        assert_eq!(
            ResponseBlob::decode(&bytes, 10),
            Err(CodecError::LengthMismatch {
                operators: 2,
                signatures: 1
            })
        );
    }

    #[test]
    fn too_many_operators_rejected() {
        let bytes = blob(4).encode().unwrap();
        assert!(matches!(
            ResponseBlob::decode(&bytes, 3),
            Err(CodecError::TooManyOperators { count: 4, max: 3 })
        ));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = blob(1).encode().unwrap();
        bytes.push(0);
        assert!(matches!(
            ResponseBlob::decode(&bytes, 10),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn truncated_input_rejected() {
        let bytes = blob(2).encode().unwrap();
        assert!(ResponseBlob::decode(&bytes[..bytes.len() - 1], 10).is_err());
    }

    #[test]
    fn absurd_length_prefix_rejected_without_allocating() {
        let mut bytes = vec![0xFF; 8];
        bytes.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            ResponseBlob::decode(&bytes, 10),
            Err(CodecError::Malformed(_))
        ));
    }
}
