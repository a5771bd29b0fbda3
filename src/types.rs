use std::fmt;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Service-assigned user identifier (opaque string).
///
/// Used as the `{user_id}` path segment of every user-scoped endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque bearer credential issued by the service.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Task identifier (numeric on the wire).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct TaskId(pub i64);

/// Chat conversation identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

/// User profile returned alongside the token at sign-in/sign-up.
///
/// Timestamps are kept as the strings the service sends; they are display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl User {
    #[must_use]
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            created_at: None,
            updated_at: None,
        }
    }

    #[must_use]
    pub fn with_timestamps(
        mut self,
        created_at: impl Into<String>,
        updated_at: impl Into<String>,
    ) -> Self {
        self.created_at = Some(created_at.into());
        self.updated_at = Some(updated_at.into());
        self
    }
}

/// The authenticated identity held by the client.
///
/// Token and profile are only ever constructed together, so a half session
/// cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: AuthToken,
    user: User,
}

impl Session {
    #[must_use]
    pub fn new(token: AuthToken, user: User) -> Self {
        Self { token, user }
    }

    #[must_use]
    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    #[must_use]
    pub fn into_parts(self) -> (AuthToken, User) {
        (self.token, self.user)
    }
}
