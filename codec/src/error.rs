use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed response blob: {0}")]
    Malformed(String),

    #[error("operator list has {operators} entries but signature list has {signatures}")]
    LengthMismatch { operators: usize, signatures: usize },

    #[error("response lists {count} operators, limit is {max}")]
    TooManyOperators { count: usize, max: usize },
}
