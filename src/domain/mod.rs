//! Domain layer: chat records, identities, and room fan-out.
//!
//! This module contains the server-side domain model: rooms and messages
//! as stored, the identity attached to a connection, the broadcast event,
//! per-connection channels, and the room registry that fans events out.

pub mod channel;
pub mod chat_group;
pub mod group_message;
pub mod identity;
pub mod message_id;
pub mod room_event;
pub mod room_registry;

pub use channel::{ChannelInbox, ChannelName, ConnectionChannel};
pub use chat_group::ChatGroup;
pub use group_message::GroupMessage;
pub use identity::{UserIdentity, UserRef};
pub use message_id::MessageId;
pub use room_event::RoomEvent;
pub use room_registry::{ChannelLayer, RoomRegistry};
