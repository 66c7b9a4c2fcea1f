//! In-memory repository that signs everybody in.

use async_trait::async_trait;
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::sleep;
use uuid::Uuid;

use crate::error::AuthError;
use crate::repository::AuthRepository;
use crate::user::{ProfileUpdate, User};

/// Options for [`MockAuthRepository`]
#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Artificial delay before every call completes
    pub latency: Duration,
}

impl MockOptions {
    /// Set the artificial delay
    pub fn with_latency(mut self, value: Duration) -> Self {
        self.latency = value;
        self
    }
}

#[derive(Debug, Default)]
struct Failures {
    any: VecDeque<AuthError>,
    by_operation: HashMap<String, VecDeque<AuthError>>,
}

impl Failures {
    fn take(&mut self, operation: &str) -> Option<AuthError> {
        self.by_operation
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.any.pop_front())
    }
}

/// Repository backed by a single in-memory session cell.
///
/// Credentials are never checked: sign-in and registration always succeed
/// unless a failure was queued with [`MockAuthRepository::fail_next`].
#[derive(Debug, Default)]
pub struct MockAuthRepository {
    session: RwLock<Option<User>>,
    failures: Mutex<Failures>,
    calls: AtomicUsize,
    options: MockOptions,
}

impl MockAuthRepository {
    pub fn new() -> Self {
        Self::new_with_options(MockOptions::default())
    }

    pub fn new_with_options(options: MockOptions) -> Self {
        Self {
            session: RwLock::new(None),
            failures: Mutex::new(Failures::default()),
            calls: AtomicUsize::new(0),
            options,
        }
    }

    /// Start with `user` already signed in
    pub fn with_user(self, user: User) -> Self {
        Self {
            session: RwLock::new(Some(user)),
            ..self
        }
    }

    /// Make the next repository call fail with `error`.
    ///
    /// Queued failures are consumed in order, one per call, whatever the operation.
    pub async fn fail_next(&self, error: AuthError) {
        self.failures.lock().await.any.push_back(error);
    }

    /// Make the next call to `operation` (a trait method name such as
    /// `"current_user"`) fail with `error`, leaving other calls alone.
    ///
    /// Takes precedence over failures queued with [`fail_next`](Self::fail_next).
    pub async fn fail_on(&self, operation: &str, error: AuthError) {
        self.failures
            .lock()
            .await
            .by_operation
            .entry(operation.to_string())
            .or_default()
            .push_back(error);
    }

    /// Number of repository calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin(&self, operation: &str) -> Result<(), AuthError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("mock repository call #{}: {}", call, operation);

        if !self.options.latency.is_zero() {
            sleep(self.options.latency).await;
        }

        match self.failures.lock().await.take(operation) {
            Some(error) => {
                warn!("mock repository failing {}: {}", operation, error);
                Err(error)
            }
            None => Ok(()),
        }
    }

    async fn store(&self, user: User) -> User {
        *self.session.write().await = Some(user.clone());
        user
    }
}

fn display_name_for(email: &str) -> String {
    match email.split('@').next() {
        Some(local) if !local.is_empty() => local.to_string(),
        _ => "User".to_string(),
    }
}

#[async_trait]
impl AuthRepository for MockAuthRepository {
    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        self.begin("current_user").await?;
        Ok(self.session.read().await.clone())
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<User, AuthError> {
        self.begin("sign_in_with_email_and_password").await?;
        let user = User::new(Uuid::new_v4().to_string(), display_name_for(email), email);
        Ok(self.store(user).await)
    }

    async fn register_with_email_and_password(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<User, AuthError> {
        self.begin("register_with_email_and_password").await?;
        let user = User::new(Uuid::new_v4().to_string(), name, email);
        Ok(self.store(user).await)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.begin("sign_out").await?;
        *self.session.write().await = None;
        Ok(())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<User, AuthError> {
        self.begin("update_profile").await?;
        let mut session = self.session.write().await;
        let current = session.as_ref().ok_or(AuthError::MissingSession)?;
        let updated = update.apply_to(current);
        *session = Some(updated.clone());
        Ok(updated)
    }

    async fn is_signed_in(&self) -> Result<bool, AuthError> {
        self.begin("is_signed_in").await?;
        Ok(self.session.read().await.is_some())
    }
}
