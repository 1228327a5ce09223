//! Events fanned out to every member of a room.
//!
//! A [`RoomEvent`] travels through the [`super::RoomRegistry`] to each
//! joined channel, where the connection's group-event callback handles it.

use serde::{Deserialize, Serialize};

use super::MessageId;

/// Broadcast event delivered to each member channel of a room.
///
/// Serialized as `{"type": "message", "message_id": 42}`. The event carries
/// only the id; every recipient loads the message from the store, so the
/// row must be committed before the event is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// A new message was posted to the room.
    Message {
        /// Id of the persisted message.
        message_id: MessageId,
    },
}
