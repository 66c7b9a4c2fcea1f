//! Home Helper authentication core
//!
//! An event-driven controller that turns user intents (sign in, register,
//! sign out, profile updates) into a stream of [`auth::AuthState`] snapshots
//! for the UI to render. The backend sits behind the
//! [`AuthRepository`](home_helper_auth::AuthRepository) trait.

pub mod auth;
pub mod config;
pub mod error;

pub use home_helper_auth as repository;

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{AuthController, AuthEvent, AuthState, AuthStatus};
    pub use crate::config::ControllerOptions;
    pub use crate::error::Error;
    pub use home_helper_auth::{AuthError, AuthRepository, MockAuthRepository, ProfileUpdate, User};
}
