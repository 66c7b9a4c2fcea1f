//! Home Helper authentication repository
//!
//! This crate defines the boundary between the auth controller and whatever
//! backend authenticates users, together with an in-memory implementation
//! used by the app today.

mod error;
mod mock;
mod repository;
mod user;
pub mod validation;

pub use error::{AuthError, AuthErrorKind};
pub use mock::{MockAuthRepository, MockOptions};
pub use repository::AuthRepository;
pub use user::{ProfileUpdate, User};
