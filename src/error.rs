//! Error handling for the Home Helper controller

use std::fmt;
use thiserror::Error;

/// Errors surfaced to callers of the controller.
///
/// Repository failures are not in here: the controller turns them into
/// [`AuthState::error`](crate::auth::AuthState::error) instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The controller task has stopped and no longer accepts events
    #[error("Auth controller is closed")]
    ControllerClosed,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for Error {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Error::ControllerClosed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Error::ControllerClosed
    }
}
