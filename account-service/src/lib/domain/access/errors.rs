use thiserror::Error;

/// Why a request could not be tied to a verified identity.
///
/// Kept for logging only; responses never reveal it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    #[error("missing bearer token")]
    MissingToken,

    #[error("{0}")]
    Token(#[from] auth::JwtError),

    #[error("unusable claims: {0}")]
    Claims(String),
}

/// Access Control Gate decision failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] UnauthenticatedReason),

    #[error("Forbidden")]
    Forbidden,
}
