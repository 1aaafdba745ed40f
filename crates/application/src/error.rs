use art_survey_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Message from a remote collaborator, kept verbatim for display.
    #[error("{0}")]
    Remote(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("a request is already in flight")]
    Busy,
    #[error("not signed in")]
    NotSignedIn,
    #[error("not found: {0}")]
    NotFound(String),
}
