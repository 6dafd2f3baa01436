//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password, or unknown login on a protected call.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No user with this login (explicit login only).
    #[error("user not found")]
    UserNotFound,

    /// Login is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Repository/store error.
    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
