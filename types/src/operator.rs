//! Operator identity and registration-binding values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseIdError;

/// Parse `0x`-prefixed hex into exactly `N` bytes.
pub(crate) fn parse_prefixed_hex<const N: usize>(s: &str) -> Result<[u8; N], ParseIdError> {
    let body = s.strip_prefix("0x").ok_or(ParseIdError::MissingPrefix)?;
    let bytes = hex::decode(body).map_err(|e| ParseIdError::InvalidHex(e.to_string()))?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| ParseIdError::WrongLength {
        expected: N,
        actual,
    })
}

/// An operator identity: the operator's 32-byte Ed25519 verifying key.
///
/// The identity is the key itself, so a signature can always be checked
/// against the identity that claims it without any further lookup.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperatorId([u8; 32]);

impl OperatorId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperatorId(0x{}\u{2026})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for OperatorId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_prefixed_hex(s).map(Self)
    }
}

/// Registration salt. Each `(operator, salt)` pair may be consumed once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Salt(pub [u8; 32]);

impl Salt {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Identifies one service deployment; registration attestations are bound to it
/// so a signature produced for one service cannot register the operator elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub [u8; 32]);

impl ServiceId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}
