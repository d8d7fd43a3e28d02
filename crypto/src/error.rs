use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("operator key {0} is not a valid Ed25519 point")]
    MalformedKey(String),

    #[error("signature does not verify for operator {0}")]
    Invalid(String),
}
