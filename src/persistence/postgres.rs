//! PostgreSQL implementation of the message store.

use async_trait::async_trait;
use sqlx::PgPool;

use super::MessageStore;
use super::models::{ChatGroupRow, GroupMessageRow};
use crate::domain::{ChatGroup, GroupMessage, MessageId, UserRef};
use crate::error::ChatError;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), ChatError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ChatError::PersistenceError(e.to_string()))
    }
}

#[async_trait]
impl MessageStore for PostgresStore {
    async fn get_room(&self, name: &str) -> Result<ChatGroup, ChatError> {
        let row = sqlx::query_as::<_, ChatGroupRow>(
            "SELECT id, group_name FROM chat_groups WHERE group_name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChatGroup::from)
            .ok_or_else(|| ChatError::RoomNotFound(name.to_string()))
    }

    async fn create_room(&self, name: &str) -> Result<ChatGroup, ChatError> {
        let row = sqlx::query_as::<_, ChatGroupRow>(
            "INSERT INTO chat_groups (group_name) VALUES ($1) \
             ON CONFLICT (group_name) DO UPDATE SET group_name = EXCLUDED.group_name \
             RETURNING id, group_name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn create_message(
        &self,
        body: &str,
        author: &UserRef,
        group: &ChatGroup,
    ) -> Result<GroupMessage, ChatError> {
        let (id, created_at) = sqlx::query_as::<_, (i64, chrono::DateTime<chrono::Utc>)>(
            "INSERT INTO group_messages (group_id, author_id, author_username, body) \
             VALUES ($1, $2, $3, $4) RETURNING id, created_at",
        )
        .bind(group.id)
        .bind(author.id)
        .bind(&author.username)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(GroupMessage {
            id: MessageId::new(id),
            body: body.to_string(),
            author: author.clone(),
            group_id: group.id,
            group_name: group.name.clone(),
            created_at,
        })
    }

    async fn get_message(&self, id: MessageId) -> Result<GroupMessage, ChatError> {
        let row = sqlx::query_as::<_, GroupMessageRow>(
            "SELECT m.id, m.body, m.author_id, m.author_username, m.group_id, g.group_name, m.created_at \
             FROM group_messages m JOIN chat_groups g ON g.id = m.group_id \
             WHERE m.id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(GroupMessage::from)
            .ok_or(ChatError::MessageNotFound(id))
    }

    async fn recent_messages(
        &self,
        group: &ChatGroup,
        limit: u32,
    ) -> Result<Vec<GroupMessage>, ChatError> {
        let rows = sqlx::query_as::<_, GroupMessageRow>(
            "SELECT * FROM ( \
                 SELECT m.id, m.body, m.author_id, m.author_username, m.group_id, g.group_name, m.created_at \
                 FROM group_messages m JOIN chat_groups g ON g.id = m.group_id \
                 WHERE m.group_id = $1 ORDER BY m.created_at DESC, m.id DESC LIMIT $2 \
             ) recent ORDER BY created_at ASC, id ASC",
        )
        .bind(group.id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GroupMessage::from).collect())
    }
}
