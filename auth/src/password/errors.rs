use thiserror::Error;

/// Error type for password operations.
///
/// Verification never produces an error: a malformed stored hash is a
/// mismatch, not a failure.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid hashing parameters: {0}")]
    InvalidParameters(String),
}
