//! Database row shapes for rooms and messages.

use chrono::{DateTime, Utc};

use crate::domain::{ChatGroup, GroupMessage, MessageId, UserRef};

/// A row of the `chat_groups` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatGroupRow {
    /// Row id.
    pub id: i64,
    /// Unique room name.
    pub group_name: String,
}

impl From<ChatGroupRow> for ChatGroup {
    fn from(row: ChatGroupRow) -> Self {
        Self::new(row.id, row.group_name)
    }
}

/// A row of `group_messages` joined with its room name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupMessageRow {
    /// Row id.
    pub id: i64,
    /// Message text.
    pub body: String,
    /// Author user id.
    pub author_id: i64,
    /// Author display name at the time of posting.
    pub author_username: String,
    /// Room row id.
    pub group_id: i64,
    /// Room name.
    pub group_name: String,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<GroupMessageRow> for GroupMessage {
    fn from(row: GroupMessageRow) -> Self {
        Self {
            id: MessageId::new(row.id),
            body: row.body,
            author: UserRef::new(row.author_id, row.author_username),
            group_id: row.group_id,
            group_name: row.group_name,
            created_at: row.created_at,
        }
    }
}
