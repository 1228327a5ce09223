//! Chat room record.

use serde::Serialize;
use utoipa::ToSchema;

/// A chat room, looked up by its unique name.
///
/// Rooms are created outside the WebSocket flow (seeded at startup or by
/// migration); connections only ever reference them by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChatGroup {
    /// Database row id.
    pub id: i64,
    /// Unique room name, also the registry group key.
    pub name: String,
}

impl ChatGroup {
    /// Creates a room record.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
