//! Parse errors for the textual forms of fixed-size identifiers.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("missing 0x prefix")]
    MissingPrefix,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}
