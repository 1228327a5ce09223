//! User identity attached to a connection by the transport layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reference to a user account: the id plus the display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct UserRef {
    /// User account id.
    pub id: i64,
    /// Display name.
    pub username: String,
}

impl UserRef {
    /// Creates a user reference.
    #[must_use]
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// Who is on the other end of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserIdentity {
    /// A resolved, logged-in user.
    Authenticated(UserRef),
    /// No credentials, or credentials that did not resolve.
    #[default]
    Anonymous,
}

impl UserIdentity {
    /// Returns `true` for [`UserIdentity::Authenticated`].
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the user reference when authenticated.
    #[must_use]
    pub const fn user(&self) -> Option<&UserRef> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated(user) => write!(f, "{}", user.username),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}
