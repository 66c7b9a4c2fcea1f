use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use home_helper::prelude::*;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Everything published so far, without waiting for more
fn drain(states: &mut mpsc::UnboundedReceiver<AuthState>) -> Vec<AuthState> {
    let mut published = Vec::new();
    loop {
        match states.try_recv() {
            Ok(state) => published.push(state),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return published,
        }
    }
}

fn statuses(states: &[AuthState]) -> Vec<AuthStatus> {
    states.iter().map(AuthState::status).collect()
}

/// Never answers any call
struct HangingRepository;

#[async_trait]
impl AuthRepository for HangingRepository {
    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        std::future::pending().await
    }

    async fn sign_in_with_email_and_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<User, AuthError> {
        std::future::pending().await
    }

    async fn register_with_email_and_password(
        &self,
        _name: &str,
        _email: &str,
        _password: &str,
    ) -> Result<User, AuthError> {
        std::future::pending().await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        std::future::pending().await
    }

    async fn update_profile(&self, _update: ProfileUpdate) -> Result<User, AuthError> {
        std::future::pending().await
    }

    async fn is_signed_in(&self) -> Result<bool, AuthError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_initial_state() {
    let controller = AuthController::spawn(MockAuthRepository::new());

    let state = controller.state().await;
    assert_eq!(state, AuthState::initial());
    assert!(state.user().is_none());
    assert!(state.error_message().is_none());
    assert!(!controller.is_closed());
}

#[tokio::test]
async fn test_check_status_without_user() {
    let controller = AuthController::spawn(MockAuthRepository::new());
    let mut states = controller.subscribe();

    let state = controller.process(AuthEvent::CheckAuthStatus).await.unwrap();

    assert_eq!(
        drain(&mut states),
        vec![AuthState::loading(), AuthState::unauthenticated()]
    );
    assert_eq!(state, AuthState::unauthenticated());
}

#[tokio::test]
async fn test_check_status_with_signed_in_user() {
    let user = User::new("1", "Ada", "ada@example.com");
    let controller = AuthController::spawn(MockAuthRepository::new().with_user(user.clone()));
    let mut states = controller.subscribe();

    controller.process(AuthEvent::CheckAuthStatus).await.unwrap();

    assert_eq!(
        drain(&mut states),
        vec![AuthState::loading(), AuthState::authenticated(user)]
    );
}

#[tokio::test]
async fn test_sign_in() {
    let controller = AuthController::spawn(MockAuthRepository::new());
    let mut states = controller.subscribe();

    controller
        .process(AuthEvent::sign_in("a@b.com", "secret"))
        .await
        .unwrap();

    let published = drain(&mut states);
    assert_eq!(
        statuses(&published),
        vec![AuthStatus::Loading, AuthStatus::Authenticated]
    );
    assert_eq!(published[1].user().unwrap().email, "a@b.com");
    assert!(published[1].error_message().is_none());
}

#[tokio::test]
async fn test_register() {
    let controller = AuthController::spawn(MockAuthRepository::new());

    let state = controller
        .process(AuthEvent::register("Ada", "ada@example.com", "secret"))
        .await
        .unwrap();

    let user = state.user().unwrap();
    assert_eq!(user.name, "Ada");
    assert_eq!(user.email, "ada@example.com");
}

#[tokio::test]
async fn test_update_profile_without_user_is_ignored() {
    let repository = Arc::new(MockAuthRepository::new());
    let controller = AuthController::spawn(repository.clone());
    let mut states = controller.subscribe();

    let state = controller
        .process(AuthEvent::UpdateProfileRequested {
            name: Some("Ada".to_string()),
            photo_url: None,
        })
        .await
        .unwrap();

    assert!(drain(&mut states).is_empty());
    assert_eq!(state, AuthState::initial());
    assert_eq!(repository.calls(), 0);
}

#[tokio::test]
async fn test_update_profile_keeps_unspecified_fields() {
    let controller = AuthController::spawn(MockAuthRepository::new());
    let registered = controller
        .process(AuthEvent::register("Ada", "ada@example.com", "secret"))
        .await
        .unwrap();
    let mut states = controller.subscribe();

    controller
        .process(AuthEvent::UpdateProfileRequested {
            name: None,
            photo_url: Some("https://img/ada.png".to_string()),
        })
        .await
        .unwrap();

    let published = drain(&mut states);
    assert_eq!(
        statuses(&published),
        vec![AuthStatus::Loading, AuthStatus::Authenticated]
    );
    let updated = published[1].user().unwrap();
    assert_eq!(updated.id, registered.user().unwrap().id);
    assert_eq!(updated.name, "Ada");
    assert_eq!(updated.photo_url.as_deref(), Some("https://img/ada.png"));
}

#[tokio::test]
async fn test_sign_out_from_any_state() {
    let repository = Arc::new(MockAuthRepository::new());
    let controller = AuthController::spawn(repository.clone());

    // initial
    let mut states = controller.subscribe();
    controller.process(AuthEvent::SignOutRequested).await.unwrap();
    assert_eq!(
        drain(&mut states),
        vec![AuthState::loading(), AuthState::unauthenticated()]
    );

    // authenticated
    controller
        .process(AuthEvent::sign_in("a@b.com", "secret"))
        .await
        .unwrap();
    let mut states = controller.subscribe();
    controller.process(AuthEvent::SignOutRequested).await.unwrap();
    assert_eq!(
        drain(&mut states),
        vec![AuthState::loading(), AuthState::unauthenticated()]
    );

    // error
    repository.fail_next(AuthError::transport("offline")).await;
    let failed = controller.process(AuthEvent::CheckAuthStatus).await.unwrap();
    assert_eq!(failed, AuthState::error("Transport error: offline"));
    let mut states = controller.subscribe();
    controller.process(AuthEvent::SignOutRequested).await.unwrap();
    assert_eq!(
        drain(&mut states),
        vec![AuthState::loading(), AuthState::unauthenticated()]
    );
}

#[tokio::test]
async fn test_error_is_not_a_dead_end() {
    let repository = Arc::new(MockAuthRepository::new());
    let controller = AuthController::spawn(repository.clone());
    let mut states = controller.subscribe();

    repository.fail_next(AuthError::InvalidCredentials).await;
    controller
        .process(AuthEvent::sign_in("a@b.com", "wrong"))
        .await
        .unwrap();

    assert_eq!(
        drain(&mut states),
        vec![
            AuthState::loading(),
            AuthState::error(AuthError::InvalidCredentials.to_string())
        ]
    );

    controller
        .process(AuthEvent::sign_in("a@b.com", "secret"))
        .await
        .unwrap();

    let published = drain(&mut states);
    assert_eq!(
        statuses(&published),
        vec![AuthStatus::Loading, AuthStatus::Authenticated]
    );
    assert_eq!(published[1].user().unwrap().email, "a@b.com");
    assert!(published[1].error_message().is_none());
}

#[tokio::test]
async fn test_error_clears_user() {
    let repository = Arc::new(MockAuthRepository::new());
    let controller = AuthController::spawn(repository.clone());
    controller
        .process(AuthEvent::sign_in("a@b.com", "secret"))
        .await
        .unwrap();

    repository.fail_next(AuthError::transport("offline")).await;
    let state = controller.process(AuthEvent::SignOutRequested).await.unwrap();

    assert_eq!(state.status(), AuthStatus::Error);
    assert_eq!(state.error_message(), Some("Transport error: offline"));
    assert!(state.user().is_none());
}

#[tokio::test]
async fn test_update_profile_failure() {
    let repository = Arc::new(MockAuthRepository::new());
    let controller = AuthController::spawn(repository.clone());
    controller
        .process(AuthEvent::sign_in("a@b.com", "secret"))
        .await
        .unwrap();

    repository.fail_next(AuthError::MissingSession).await;
    let state = controller
        .process(AuthEvent::UpdateProfileRequested {
            name: Some("Ada".to_string()),
            photo_url: None,
        })
        .await
        .unwrap();

    assert_eq!(state, AuthState::error("No user is signed in"));
}

#[tokio::test]
async fn test_status_changed_is_idempotent() {
    let controller = AuthController::spawn(MockAuthRepository::new());
    let mut states = controller.subscribe();

    let first = controller.process(AuthEvent::AuthStatusChanged).await.unwrap();
    let second = controller.process(AuthEvent::AuthStatusChanged).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.status(), AuthStatus::Unauthenticated);
    assert_eq!(
        statuses(&drain(&mut states)),
        vec![
            AuthStatus::Loading,
            AuthStatus::Unauthenticated,
            AuthStatus::Loading,
            AuthStatus::Unauthenticated
        ]
    );
}

#[tokio::test]
async fn test_events_are_handled_in_arrival_order() {
    let repository = MockAuthRepository::new_with_options(
        home_helper::repository::MockOptions::default().with_latency(Duration::from_millis(5)),
    );
    let controller = AuthController::spawn(repository);
    let mut states = controller.subscribe();

    controller
        .add(AuthEvent::sign_in("a@b.com", "secret"))
        .await
        .unwrap();
    controller.add(AuthEvent::SignOutRequested).await.unwrap();
    let last = controller.process(AuthEvent::CheckAuthStatus).await.unwrap();

    assert_eq!(
        statuses(&drain(&mut states)),
        vec![
            AuthStatus::Loading,
            AuthStatus::Authenticated,
            AuthStatus::Loading,
            AuthStatus::Unauthenticated,
            AuthStatus::Loading,
            AuthStatus::Unauthenticated
        ]
    );
    assert_eq!(last, controller.state().await);
}

#[tokio::test(start_paused = true)]
async fn test_repository_timeout() {
    let options = ControllerOptions::default().with_repository_timeout(Some(Duration::from_secs(3)));
    let controller = AuthController::spawn_with_options(HangingRepository, options).unwrap();
    let mut states = controller.subscribe();

    let state = controller
        .process(AuthEvent::sign_in("a@b.com", "secret"))
        .await
        .unwrap();

    assert_eq!(state.status(), AuthStatus::Error);
    assert!(state.error_message().unwrap().contains("timed out"));

    // the queue keeps moving after a timeout
    let state = controller.process(AuthEvent::CheckAuthStatus).await.unwrap();
    assert_eq!(state.status(), AuthStatus::Error);
    assert_eq!(drain(&mut states).len(), 4);
}

#[tokio::test]
async fn test_invalid_options_are_rejected() {
    let result = AuthController::spawn_with_options(
        MockAuthRepository::new(),
        ControllerOptions::default().with_event_buffer(0),
    );

    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn test_handles_share_one_state() {
    let controller = AuthController::spawn(MockAuthRepository::new());
    let other = controller.clone();

    controller
        .process(AuthEvent::sign_in("a@b.com", "secret"))
        .await
        .unwrap();

    assert!(other.state().await.is_authenticated());
}

#[tokio::test]
async fn test_register_failure() {
    let repository = Arc::new(MockAuthRepository::new());
    let controller = AuthController::spawn(repository.clone());
    let mut states = controller.subscribe();

    repository
        .fail_next(AuthError::DuplicateAccount("a@b.com".to_string()))
        .await;
    controller
        .process(AuthEvent::register("Ada", "a@b.com", "secret"))
        .await
        .unwrap();

    assert_eq!(
        drain(&mut states),
        vec![
            AuthState::loading(),
            AuthState::error("An account already exists for a@b.com")
        ]
    );
}

#[tokio::test]
async fn test_check_status_when_current_user_fails() {
    let repository = Arc::new(
        MockAuthRepository::new().with_user(User::new("1", "Ada", "ada@example.com")),
    );
    let controller = AuthController::spawn(repository.clone());
    let mut states = controller.subscribe();

    repository
        .fail_on("current_user", AuthError::transport("offline"))
        .await;
    controller.process(AuthEvent::CheckAuthStatus).await.unwrap();

    assert_eq!(
        drain(&mut states),
        vec![
            AuthState::loading(),
            AuthState::error("Transport error: offline")
        ]
    );
    assert_eq!(repository.calls(), 2);
}

#[tokio::test]
async fn test_status_changed_is_idempotent_when_signed_in() {
    let user = User::new("1", "Ada", "ada@example.com");
    let controller = AuthController::spawn(MockAuthRepository::new().with_user(user.clone()));
    let mut states = controller.subscribe();

    let first = controller.process(AuthEvent::AuthStatusChanged).await.unwrap();
    let second = controller.process(AuthEvent::AuthStatusChanged).await.unwrap();

    assert_eq!(first, AuthState::authenticated(user.clone()));
    assert_eq!(second, first);
    assert_eq!(
        drain(&mut states),
        vec![
            AuthState::loading(),
            AuthState::authenticated(user.clone()),
            AuthState::loading(),
            AuthState::authenticated(user)
        ]
    );
}

#[tokio::test]
async fn test_slow_subscriber_receives_every_state() {
    let controller = AuthController::spawn(MockAuthRepository::new());
    let mut states = controller.subscribe();

    for _ in 0..100 {
        controller.process(AuthEvent::SignOutRequested).await.unwrap();
    }

    let published = drain(&mut states);
    assert_eq!(published.len(), 200);
    for pair in published.chunks(2) {
        assert_eq!(
            pair,
            &[AuthState::loading(), AuthState::unauthenticated()][..]
        );
    }
}

#[tokio::test]
async fn test_subscription_ends_with_controller() {
    let controller = AuthController::spawn(MockAuthRepository::new());
    let mut states = controller.subscribe();

    controller.process(AuthEvent::CheckAuthStatus).await.unwrap();
    drop(controller);

    assert_eq!(states.recv().await, Some(AuthState::loading()));
    assert_eq!(states.recv().await, Some(AuthState::unauthenticated()));
    assert_eq!(states.recv().await, None);
}
