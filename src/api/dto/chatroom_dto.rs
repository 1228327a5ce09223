//! Chat room DTOs for room info and message history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::GroupMessage;

/// Response body for `GET /chatrooms/{chatroom_name}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatRoomResponse {
    /// Room id.
    pub id: i64,
    /// Room name.
    pub name: String,
    /// Number of connections currently joined to the room.
    pub member_count: usize,
}

/// One message in a history listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageDto {
    /// Message id.
    pub id: i64,
    /// Message text.
    pub body: String,
    /// Author user id.
    pub author_id: i64,
    /// Author display name.
    pub author: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<GroupMessage> for MessageDto {
    fn from(message: GroupMessage) -> Self {
        Self {
            id: message.id.get(),
            body: message.body,
            author_id: message.author.id,
            author: message.author.username,
            created_at: message.created_at,
        }
    }
}

/// Response body for `GET /chatrooms/{chatroom_name}/messages`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageHistoryResponse {
    /// Room name.
    pub chatroom: String,
    /// Messages, oldest first.
    pub data: Vec<MessageDto>,
}
