//! Authentication error types.

use thiserror::Error;

use cloudberry_core::EmailError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A required credential field was left blank.
    #[error("all fields are required")]
    MissingFields,

    /// Password and confirmation do not match.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Wrong email/password, or unknown user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The identity provider rejected the operation.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// HTTP request to the identity provider failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
