//! Persisted chat message.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{MessageId, UserRef};

/// A chat message stored in a room.
///
/// Immutable once created. The id and `created_at` are assigned by the
/// store; nothing in the gateway updates or deletes messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GroupMessage {
    /// Store-assigned identifier.
    #[schema(value_type = i64)]
    pub id: MessageId,
    /// Message text as sent by the author.
    pub body: String,
    /// Author of the message.
    pub author: UserRef,
    /// Id of the room the message was posted to.
    pub group_id: i64,
    /// Name of the room the message was posted to.
    pub group_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl GroupMessage {
    /// Returns `true` if `user` wrote this message.
    #[must_use]
    pub fn is_authored_by(&self, user: &UserRef) -> bool {
        self.author.id == user.id
    }
}
