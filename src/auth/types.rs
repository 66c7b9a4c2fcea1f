//! Types for the authentication state machine

use home_helper_auth::{ProfileUpdate, User};
use serde::{Deserialize, Serialize};

/// Where the authentication flow currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Initial,
    Loading,
    Authenticated,
    Unauthenticated,
    Error,
}

/// Snapshot published by the controller after every transition.
///
/// Built only through the constructors below, so `user` is present exactly
/// when the status is `Authenticated` and `error_message` exactly when it
/// is `Error`.
///
/// Deserialized states go through the same check, so a payload such as an
/// authenticated status without a user is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawAuthState")]
pub struct AuthState {
    status: AuthStatus,
    user: Option<User>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAuthState {
    status: AuthStatus,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    error_message: Option<String>,
}

impl TryFrom<RawAuthState> for AuthState {
    type Error = String;

    fn try_from(raw: RawAuthState) -> Result<Self, Self::Error> {
        match (raw.status, raw.user, raw.error_message) {
            (AuthStatus::Authenticated, Some(user), None) => Ok(Self::authenticated(user)),
            (AuthStatus::Error, None, Some(message)) => Ok(Self::error(message)),
            (
                status @ (AuthStatus::Initial | AuthStatus::Loading | AuthStatus::Unauthenticated),
                None,
                None,
            ) => Ok(Self::with_status(status)),
            (status, user, message) => Err(format!(
                "inconsistent auth state: status {:?} with user {} and error message {}",
                status,
                if user.is_some() { "present" } else { "absent" },
                if message.is_some() { "present" } else { "absent" },
            )),
        }
    }
}

impl AuthState {
    pub fn initial() -> Self {
        Self::with_status(AuthStatus::Initial)
    }

    pub fn loading() -> Self {
        Self::with_status(AuthStatus::Loading)
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            user: Some(user),
            error_message: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::with_status(AuthStatus::Unauthenticated)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: AuthStatus::Error,
            user: None,
            error_message: Some(message.into()),
        }
    }

    fn with_status(status: AuthStatus) -> Self {
        Self {
            status,
            user: None,
            error_message: None,
        }
    }

    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::initial()
    }
}

/// An intent submitted to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Ask the repository whether someone is signed in
    CheckAuthStatus,
    SignInRequested {
        email: String,
        password: String,
    },
    RegisterRequested {
        name: String,
        email: String,
        password: String,
    },
    SignOutRequested,
    /// Ignored unless a user is currently authenticated
    UpdateProfileRequested {
        name: Option<String>,
        photo_url: Option<String>,
    },
    /// Something outside the controller changed the session; re-check it
    AuthStatusChanged,
}

impl AuthEvent {
    pub fn sign_in(email: impl Into<String>, password: impl Into<String>) -> Self {
        AuthEvent::SignInRequested {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn register(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        AuthEvent::RegisterRequested {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn update_profile(update: ProfileUpdate) -> Self {
        AuthEvent::UpdateProfileRequested {
            name: update.name,
            photo_url: update.photo_url,
        }
    }

    /// Variant name, for logs. Never includes the payload.
    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::CheckAuthStatus => "CheckAuthStatus",
            AuthEvent::SignInRequested { .. } => "SignInRequested",
            AuthEvent::RegisterRequested { .. } => "RegisterRequested",
            AuthEvent::SignOutRequested => "SignOutRequested",
            AuthEvent::UpdateProfileRequested { .. } => "UpdateProfileRequested",
            AuthEvent::AuthStatusChanged => "AuthStatusChanged",
        }
    }
}
