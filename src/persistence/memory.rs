//! In-memory message store.
//!
//! Used when `PERSISTENCE_ENABLED=false` and throughout the test suite.
//! Ids are assigned sequentially starting at 1, like a database sequence.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::MessageStore;
use crate::domain::{ChatGroup, GroupMessage, MessageId, UserRef};
use crate::error::ChatError;

#[derive(Debug, Default)]
struct Tables {
    rooms: HashMap<String, ChatGroup>,
    messages: BTreeMap<MessageId, GroupMessage>,
    next_room_id: i64,
    next_message_id: i64,
}

/// Process-local store backed by `RwLock`-protected maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given rooms.
    pub async fn with_rooms<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let store = Self::new();
        for name in names {
            // never fails for the in-memory store
            let _ = store.create_room(name.as_ref()).await;
        }
        store
    }

    /// Returns the number of stored messages.
    pub async fn message_count(&self) -> usize {
        self.tables.read().await.messages.len()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn get_room(&self, name: &str) -> Result<ChatGroup, ChatError> {
        self.tables
            .read()
            .await
            .rooms
            .get(name)
            .cloned()
            .ok_or_else(|| ChatError::RoomNotFound(name.to_string()))
    }

    async fn create_room(&self, name: &str) -> Result<ChatGroup, ChatError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.rooms.get(name) {
            return Ok(existing.clone());
        }
        tables.next_room_id += 1;
        let room = ChatGroup::new(tables.next_room_id, name);
        tables.rooms.insert(name.to_string(), room.clone());
        Ok(room)
    }

    async fn create_message(
        &self,
        body: &str,
        author: &UserRef,
        group: &ChatGroup,
    ) -> Result<GroupMessage, ChatError> {
        let mut tables = self.tables.write().await;
        tables.next_message_id += 1;
        let message = GroupMessage {
            id: MessageId::new(tables.next_message_id),
            body: body.to_string(),
            author: author.clone(),
            group_id: group.id,
            group_name: group.name.clone(),
            created_at: Utc::now(),
        };
        tables.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn get_message(&self, id: MessageId) -> Result<GroupMessage, ChatError> {
        self.tables
            .read()
            .await
            .messages
            .get(&id)
            .cloned()
            .ok_or(ChatError::MessageNotFound(id))
    }

    async fn recent_messages(
        &self,
        group: &ChatGroup,
        limit: u32,
    ) -> Result<Vec<GroupMessage>, ChatError> {
        let tables = self.tables.read().await;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut recent: Vec<GroupMessage> = tables
            .messages
            .values()
            .rev()
            .filter(|m| m.group_id == group.id)
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }
}
