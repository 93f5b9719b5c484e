//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] bramble_core::UsernameError),

    /// No account with this username.
    ///
    /// Kept separate from [`Self::InvalidCredentials`] because the page flow
    /// sends unknown users to registration rather than back to login.
    #[error("unknown user")]
    UnknownUser,

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username already taken at registration.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
