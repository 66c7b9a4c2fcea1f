//! The data-access boundary consumed by the auth controller.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::AuthError;
use crate::user::{ProfileUpdate, User};

/// Authentication backend.
///
/// Every operation is asynchronous so a networked implementation can be
/// swapped in without touching the controller, even though the in-memory
/// [`MockAuthRepository`](crate::MockAuthRepository) never really suspends.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// The signed-in user, if any.
    async fn current_user(&self) -> Result<Option<User>, AuthError>;

    /// Fails with [`AuthError::InvalidCredentials`] when the backend rejects the pair.
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError>;

    /// Creates an account and signs it in.
    /// Fails with [`AuthError::DuplicateAccount`] or [`AuthError::Validation`].
    async fn register_with_email_and_password(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError>;

    /// Clears any persisted session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Fails with [`AuthError::MissingSession`] when no user is signed in.
    async fn update_profile(&self, update: ProfileUpdate) -> Result<User, AuthError>;

    async fn is_signed_in(&self) -> Result<bool, AuthError>;
}

#[async_trait]
impl<R: AuthRepository + ?Sized> AuthRepository for Arc<R> {
    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        (**self).current_user().await
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        (**self).sign_in_with_email_and_password(email, password).await
    }

    async fn register_with_email_and_password(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        (**self)
            .register_with_email_and_password(name, email, password)
            .await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        (**self).sign_out().await
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<User, AuthError> {
        (**self).update_profile(update).await
    }

    async fn is_signed_in(&self) -> Result<bool, AuthError> {
        (**self).is_signed_in().await
    }
}
