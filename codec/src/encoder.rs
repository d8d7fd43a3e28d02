//! Unambiguous field encoding ahead of hashing.

use trappist_crypto::blake2b_256;
use trappist_types::Digest;

/// Accumulates typed fields, then hashes them into a [`Digest`].
///
/// Integers are fixed-width big-endian; strings, byte strings and list
/// counts carry a `u32` big-endian length prefix; fixed-size arrays are raw.
pub struct DigestEncoder {
    buf: Vec<u8>,
}

impl DigestEncoder {
    /// Start an encoding under a domain tag.
    pub fn new(domain: &str) -> Self {
        let mut encoder = Self {
            buf: Vec::with_capacity(128),
        };
        encoder.put_str(domain);
        encoder
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Fixed-size value whose length is implied by the field position.
    pub fn put_fixed(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Variable-length bytes, prefixed by their length.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.put_len(bytes.len());
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn put_str(&mut self, value: &str) -> &mut Self {
        self.put_bytes(value.as_bytes())
    }

    /// Element count of a list that follows.
    pub fn put_len(&mut self, len: usize) -> &mut Self {
        // Callers bound lengths: blobs by the decode limit, task payloads by
        // the manager's payload limit. Longer input would saturate here.
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        self.put_u32(len)
    }

    /// The exact bytes that will be hashed.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn finish(&self) -> Digest {
        Digest::new(blake2b_256(&self.buf))
    }
}
