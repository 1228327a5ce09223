//! Identity resolution for incoming connections.
//!
//! The gateway does not manage accounts or sessions. It only maps the
//! token a client presents to a [`UserIdentity`]; anything that does not
//! resolve is [`UserIdentity::Anonymous`].

use std::collections::HashMap;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::domain::{UserIdentity, UserRef};

/// Maps a presented token to an identity.
pub trait IdentityResolver: Send + Sync + std::fmt::Debug {
    /// Resolves `token`; `None` or an unknown token yields `Anonymous`.
    fn resolve(&self, token: Option<&str>) -> UserIdentity;
}

/// Error raised when a `CHAT_USERS` entry cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid user entry {entry:?}: expected token:id:username")]
pub struct UserEntryError {
    /// The offending entry.
    pub entry: String,
}

/// Fixed token table, loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenResolver {
    users: HashMap<String, UserRef>,
}

impl StaticTokenResolver {
    /// Creates an empty resolver; every token resolves to `Anonymous`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` for `user`.
    #[must_use]
    pub fn with_user(mut self, token: impl Into<String>, user: UserRef) -> Self {
        self.users.insert(token.into(), user);
        self
    }

    /// Parses a comma-separated list of `token:id:username` entries.
    ///
    /// # Errors
    ///
    /// Returns [`UserEntryError`] for the first entry that has an empty
    /// token or username, or a non-numeric id.
    pub fn parse(entries: &str) -> Result<Self, UserEntryError> {
        let mut resolver = Self::new();
        for entry in entries.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = || UserEntryError {
                entry: entry.to_string(),
            };
            let mut parts = entry.splitn(3, ':');
            let (Some(token), Some(id), Some(username)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid());
            };
            let id: i64 = id.parse().map_err(|_| invalid())?;
            if token.is_empty() || username.is_empty() {
                return Err(invalid());
            }
            resolver.users.insert(token.to_string(), UserRef::new(id, username));
        }
        Ok(resolver)
    }

    /// Returns the number of registered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no tokens are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl IdentityResolver for StaticTokenResolver {
    fn resolve(&self, token: Option<&str>) -> UserIdentity {
        token
            .and_then(|t| self.users.get(t))
            .cloned()
            .map_or(UserIdentity::Anonymous, UserIdentity::Authenticated)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Picks the credential for a WebSocket request: a non-empty `?token=`
/// query value, else the bearer header.
#[must_use]
pub fn request_token<'a>(query: Option<&'a str>, headers: &'a HeaderMap) -> Option<&'a str> {
    query
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(headers))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn parses_user_table() {
        let Ok(resolver) = StaticTokenResolver::parse("tok-a:1:alice, tok-b:2:bob") else {
            panic!("valid table rejected");
        };
        assert_eq!(resolver.len(), 2);
        assert_eq!(
            resolver.resolve(Some("tok-b")),
            UserIdentity::Authenticated(UserRef::new(2, "bob"))
        );
    }

    #[test]
    fn empty_table_is_valid() {
        let Ok(resolver) = StaticTokenResolver::parse("") else {
            panic!("empty table rejected");
        };
        assert!(resolver.is_empty());
    }

    #[test]
    fn rejects_bad_entries() {
        assert!(StaticTokenResolver::parse("tok-a:one:alice").is_err());
        assert!(StaticTokenResolver::parse("tok-a:1").is_err());
        assert!(StaticTokenResolver::parse(":1:alice").is_err());
    }

    #[test]
    fn unknown_or_missing_token_is_anonymous() {
        let resolver = StaticTokenResolver::new().with_user("tok", UserRef::new(1, "alice"));
        assert_eq!(resolver.resolve(None), UserIdentity::Anonymous);
        assert_eq!(resolver.resolve(Some("nope")), UserIdentity::Anonymous);
        assert!(resolver.resolve(Some("tok")).is_authenticated());
    }

    #[test]
    fn reads_bearer_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok-a"));
        assert_eq!(bearer_token(&headers), Some("tok-a"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn empty_query_token_falls_back_to_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok-a"));
        assert_eq!(request_token(Some(""), &headers), Some("tok-a"));
        assert_eq!(request_token(None, &headers), Some("tok-a"));
        assert_eq!(request_token(Some("tok-b"), &headers), Some("tok-b"));
        assert_eq!(request_token(Some(" "), &HeaderMap::new()), None);
    }
}
