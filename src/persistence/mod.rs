//! Persistence layer: chat rooms and their messages.
//!
//! [`MessageStore`] is the storage contract the WebSocket handler and the
//! REST layer depend on. [`postgres::PostgresStore`] backs it with
//! `sqlx::PgPool`; [`memory::MemoryStore`] keeps everything in process for
//! tests and for running with persistence disabled.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{ChatGroup, GroupMessage, MessageId, UserRef};
use crate::error::ChatError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Storage for rooms and messages.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    /// Looks up a room by its unique name.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::RoomNotFound`] if no room has that name, or
    /// [`ChatError::PersistenceError`] on storage failure.
    async fn get_room(&self, name: &str) -> Result<ChatGroup, ChatError>;

    /// Creates a room, or returns the existing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::PersistenceError`] on storage failure.
    async fn create_room(&self, name: &str) -> Result<ChatGroup, ChatError>;

    /// Persists a new message and returns it with its assigned id and
    /// timestamp. The row is committed when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::PersistenceError`] on storage failure.
    async fn create_message(
        &self,
        body: &str,
        author: &UserRef,
        group: &ChatGroup,
    ) -> Result<GroupMessage, ChatError>;

    /// Loads a message by id.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`] if the id is unknown, or
    /// [`ChatError::PersistenceError`] on storage failure.
    async fn get_message(&self, id: MessageId) -> Result<GroupMessage, ChatError>;

    /// Returns the newest `limit` messages of `group`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::PersistenceError`] on storage failure.
    async fn recent_messages(
        &self,
        group: &ChatGroup,
        limit: u32,
    ) -> Result<Vec<GroupMessage>, ChatError>;
}
