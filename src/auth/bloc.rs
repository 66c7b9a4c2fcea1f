//! Transition logic: one event in, zero or more published states out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use home_helper_auth::{AuthError, AuthRepository, ProfileUpdate, User};
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

use super::subscribers::Subscribers;
use super::types::{AuthEvent, AuthState};

/// Owns the repository and the current state cell.
///
/// Callers must serialize [`AuthBloc::handle`]; the controller task does this
/// by draining its queue one event at a time.
pub(crate) struct AuthBloc<R> {
    repository: R,
    state: Arc<RwLock<AuthState>>,
    subscribers: Subscribers,
    repository_timeout: Option<Duration>,
}

impl<R: AuthRepository> AuthBloc<R> {
    /// `state` and `subscribers` are shared with the controller handle so it
    /// can read snapshots and register listeners without going through the queue.
    pub(crate) fn new(
        repository: R,
        state: Arc<RwLock<AuthState>>,
        subscribers: Subscribers,
        repository_timeout: Option<Duration>,
    ) -> Self {
        Self {
            repository,
            state,
            subscribers,
            repository_timeout,
        }
    }

    /// Snapshot of the current state
    pub(crate) async fn current(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// Run one event to completion, publishing every state it produces.
    ///
    /// Repository failures end in an `Error` state and never escape.
    pub(crate) async fn handle(&self, event: AuthEvent) {
        debug!(event = event.name(), "handling auth event");

        match event {
            AuthEvent::CheckAuthStatus => self.check_status().await,
            AuthEvent::SignInRequested { email, password } => {
                self.emit(AuthState::loading()).await;
                let result = self
                    .call(
                        self.repository
                            .sign_in_with_email_and_password(&email, &password),
                    )
                    .await;
                self.resolve(result).await;
            }
            AuthEvent::RegisterRequested {
                name,
                email,
                password,
            } => {
                self.emit(AuthState::loading()).await;
                let result = self
                    .call(
                        self.repository
                            .register_with_email_and_password(&name, &email, &password),
                    )
                    .await;
                self.resolve(result).await;
            }
            AuthEvent::SignOutRequested => {
                self.emit(AuthState::loading()).await;
                match self.call(self.repository.sign_out()).await {
                    Ok(()) => self.emit(AuthState::unauthenticated()).await,
                    Err(e) => self.fail(e).await,
                }
            }
            AuthEvent::UpdateProfileRequested { name, photo_url } => {
                let current = match self.current().await.user().cloned() {
                    Some(user) => user,
                    None => {
                        debug!("no authenticated user, ignoring profile update");
                        return;
                    }
                };

                self.emit(AuthState::loading()).await;
                let update = ProfileUpdate::new(name, photo_url).resolve_against(&current);
                let result = self.call(self.repository.update_profile(update)).await;
                self.resolve(result).await;
            }
            AuthEvent::AuthStatusChanged => {
                trace!("auth status changed, re-checking");
                self.check_status().await;
            }
        }
    }

    async fn check_status(&self) {
        self.emit(AuthState::loading()).await;

        let result = self
            .call(async {
                if self.repository.is_signed_in().await? {
                    self.repository.current_user().await
                } else {
                    Ok(None)
                }
            })
            .await;

        match result {
            Ok(Some(user)) => self.emit(AuthState::authenticated(user)).await,
            Ok(None) => self.emit(AuthState::unauthenticated()).await,
            Err(e) => self.fail(e).await,
        }
    }

    async fn call<T, F>(&self, operation: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        match self.repository_timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .unwrap_or(Err(AuthError::Timeout(limit))),
            None => operation.await,
        }
    }

    async fn resolve(&self, result: Result<User, AuthError>) {
        match result {
            Ok(user) => {
                info!(user_id = %user.id, "user authenticated");
                self.emit(AuthState::authenticated(user)).await;
            }
            Err(e) => self.fail(e).await,
        }
    }

    async fn fail(&self, error: AuthError) {
        warn!(kind = ?error.kind(), "auth repository call failed: {}", error);
        self.emit(AuthState::error(error.to_string())).await;
    }

    /// Replace the current state and publish it to subscribers
    async fn emit(&self, state: AuthState) {
        debug!(status = ?state.status(), "publishing auth state");
        *self.state.write().await = state.clone();
        if self.subscribers.publish(&state) == 0 {
            trace!("no auth state subscribers");
        }
    }
}
