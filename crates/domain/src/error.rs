use thiserror::Error;

use crate::Dimension;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),
    #[error("score must be between 0 and 10, got {0}")]
    ScoreOutOfRange(i64),
    #[error("storage path must not be empty")]
    EmptyStoragePath,
    #[error("{0} score has not been selected")]
    UnselectedScore(Dimension),
    #[error("{0} rationale is required when the score differs from {1}")]
    MissingRationale(Dimension, u8),
}
