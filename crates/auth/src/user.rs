//! User identity and profile updates

use serde::{Deserialize, Serialize};

/// A signed-in user.
///
/// Equality compares every field, so an updated profile is never equal to
/// the user it replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable, non-empty identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Avatar location, if the user set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            photo_url: None,
        }
    }

    /// Set the avatar location
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }
}

/// Profile fields to change. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    pub fn new(name: Option<String>, photo_url: Option<String>) -> Self {
        Self { name, photo_url }
    }

    /// Fill absent fields from `current`.
    pub fn resolve_against(&self, current: &User) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name.clone().or_else(|| Some(current.name.clone())),
            photo_url: self.photo_url.clone().or_else(|| current.photo_url.clone()),
        }
    }

    /// Apply the update to `user`, keeping its identity.
    pub fn apply_to(&self, user: &User) -> User {
        User {
            id: user.id.clone(),
            name: self.name.clone().unwrap_or_else(|| user.name.clone()),
            email: user.email.clone(),
            photo_url: self.photo_url.clone().or_else(|| user.photo_url.clone()),
        }
    }
}
