use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by an [`AuthRepository`](crate::AuthRepository).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Malformed input, e.g. an email without `@`
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for {0}")]
    DuplicateAccount(String),

    #[error("No user is signed in")]
    MissingSession,

    /// Network or backend failure, opaque to callers
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Repository call timed out after {0:?}")]
    Timeout(Duration),
}

/// Coarse classification of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    Validation,
    Auth,
    Transport,
}

impl AuthError {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        AuthError::Validation(msg.to_string())
    }

    /// Create a new transport error
    pub fn transport<T: fmt::Display>(msg: T) -> Self {
        AuthError::Transport(msg.to_string())
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::Validation(_) => AuthErrorKind::Validation,
            AuthError::InvalidCredentials
            | AuthError::DuplicateAccount(_)
            | AuthError::MissingSession => AuthErrorKind::Auth,
            AuthError::Transport(_) | AuthError::Timeout(_) => AuthErrorKind::Transport,
        }
    }
}
