use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuorumError {
    #[error("quorum {0} has no strategies")]
    NoStrategies(u8),

    #[error("strategy {0} has a zero multiplier")]
    ZeroMultiplier(String),

    #[error("strategy {0} is listed twice")]
    DuplicateStrategy(String),

    #[error("threshold {0} bps is outside 1..=10000")]
    InvalidThreshold(u32),
}
