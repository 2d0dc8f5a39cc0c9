use thiserror::Error;

use crate::protocol::ErrorBody;

/// The proxy cannot run because a required setting is absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("{var} is not set")]
    MissingCredential { var: String },
}

impl From<ConfigurationError> for ErrorBody {
    fn from(value: ConfigurationError) -> Self {
        ErrorBody::new(value.to_string())
    }
}

/// Anything that went wrong between issuing the outbound call and holding a
/// well-formed result. Never shown to the caller as-is.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation transport failed: {0}")]
    Transport(String),
    #[error("generation api returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("empty response from generation api")]
    EmptyResponse,
    #[error("response is not valid json: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response violates result schema: {0}")]
    SchemaViolation(String),
}

impl GenerationError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}
