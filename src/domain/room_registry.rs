//! Room membership and fan-out.
//!
//! [`RoomRegistry`] is the capability set a connection needs from the
//! group-messaging layer. [`ChannelLayer`] is the in-process implementation:
//! each room maps channel names to the connection channels joined to it,
//! behind a [`tokio::sync::RwLock`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::sync::mpsc::error::TrySendError;

use super::channel::{self, ChannelInbox, ChannelName, ConnectionChannel};
use super::RoomEvent;

/// Join/leave/broadcast by room name.
#[async_trait]
pub trait RoomRegistry: Send + Sync + std::fmt::Debug {
    /// Adds `channel` to `room`. Joining twice is a no-op.
    async fn join(&self, room: &str, channel: &ConnectionChannel);

    /// Removes the channel named `channel` from `room`, if present.
    async fn leave(&self, room: &str, channel: &ChannelName);

    /// Delivers `event` to every channel joined to `room`.
    ///
    /// Returns the number of channels the event was enqueued to.
    async fn broadcast(&self, room: &str, event: RoomEvent) -> usize;
}

/// In-process channel layer.
///
/// Creates connection channels and tracks which of them are joined to
/// which room. Delivery never blocks the publisher: an inbox that is full
/// or closed misses the event and a warning is logged.
#[derive(Debug)]
pub struct ChannelLayer {
    groups: RwLock<HashMap<String, HashMap<ChannelName, ConnectionChannel>>>,
    capacity: usize,
    prefix: String,
}

impl ChannelLayer {
    /// Creates a layer whose channels buffer up to `capacity` events each.
    #[must_use]
    pub fn new(prefix: impl Into<String>, capacity: usize) -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
            capacity,
            prefix: prefix.into(),
        }
    }

    /// Creates a new connection channel and its inbox.
    #[must_use]
    pub fn new_channel(&self) -> (ConnectionChannel, ChannelInbox) {
        channel::channel(&self.prefix, self.capacity)
    }

    /// Returns how many channels are joined to `room`.
    pub async fn member_count(&self, room: &str) -> usize {
        self.groups.read().await.get(room).map_or(0, HashMap::len)
    }

    /// Returns the number of rooms with at least one member.
    pub async fn room_count(&self) -> usize {
        self.groups.read().await.len()
    }
}

impl Default for ChannelLayer {
    fn default() -> Self {
        Self::new("chat", 100)
    }
}

#[async_trait]
impl RoomRegistry for ChannelLayer {
    async fn join(&self, room: &str, channel: &ConnectionChannel) {
        let mut groups = self.groups.write().await;
        groups
            .entry(room.to_string())
            .or_default()
            .insert(channel.name().clone(), channel.clone());
        tracing::debug!(room, channel = %channel.name(), "channel joined room");
    }

    async fn leave(&self, room: &str, channel: &ChannelName) {
        let mut groups = self.groups.write().await;
        if let Some(members) = groups.get_mut(room) {
            members.remove(channel);
            if members.is_empty() {
                groups.remove(room);
            }
        }
        tracing::debug!(room, %channel, "channel left room");
    }

    async fn broadcast(&self, room: &str, event: RoomEvent) -> usize {
        let groups = self.groups.read().await;
        let Some(members) = groups.get(room) else {
            return 0;
        };

        let mut delivered = 0;
        for member in members.values() {
            match member.try_deliver(event) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(room, channel = %member.name(), "channel over capacity, event dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!(room, channel = %member.name(), "channel closed, event dropped");
                }
            }
        }
        delivered
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::MessageId;

    fn event(id: i64) -> RoomEvent {
        RoomEvent::Message {
            message_id: MessageId::new(id),
        }
    }

    #[tokio::test]
    async fn broadcast_without_members_returns_zero() {
        let layer = ChannelLayer::default();
        assert_eq!(layer.broadcast("general", event(1)).await, 0);
    }

    #[tokio::test]
    async fn every_member_receives_broadcast() {
        let layer = ChannelLayer::default();
        let (a, mut a_rx) = layer.new_channel();
        let (b, mut b_rx) = layer.new_channel();
        layer.join("general", &a).await;
        layer.join("general", &b).await;

        assert_eq!(layer.broadcast("general", event(5)).await, 2);
        assert_eq!(a_rx.recv().await, Some(event(5)));
        assert_eq!(b_rx.recv().await, Some(event(5)));
    }

    #[tokio::test]
    async fn broadcast_stays_within_room() {
        let layer = ChannelLayer::default();
        let (a, mut a_rx) = layer.new_channel();
        let (b, mut b_rx) = layer.new_channel();
        layer.join("general", &a).await;
        layer.join("random", &b).await;

        assert_eq!(layer.broadcast("random", event(2)).await, 1);
        assert!(a_rx.try_recv().is_none());
        assert_eq!(b_rx.recv().await, Some(event(2)));
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let layer = ChannelLayer::default();
        let (a, _a_rx) = layer.new_channel();
        layer.join("general", &a).await;
        layer.join("general", &a).await;
        assert_eq!(layer.member_count("general").await, 1);
    }

    #[tokio::test]
    async fn leave_removes_member_and_empty_room() {
        let layer = ChannelLayer::default();
        let (a, mut a_rx) = layer.new_channel();
        layer.join("general", &a).await;
        assert_eq!(layer.room_count().await, 1);

        layer.leave("general", a.name()).await;
        assert_eq!(layer.member_count("general").await, 0);
        assert_eq!(layer.room_count().await, 0);
        assert_eq!(layer.broadcast("general", event(1)).await, 0);
        assert!(a_rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn leave_unknown_channel_is_noop() {
        let layer = ChannelLayer::default();
        let (a, _a_rx) = layer.new_channel();
        let (b, _b_rx) = layer.new_channel();
        layer.join("general", &a).await;
        layer.leave("general", b.name()).await;
        layer.leave("nowhere", b.name()).await;
        assert_eq!(layer.member_count("general").await, 1);
    }

    #[tokio::test]
    async fn full_inbox_does_not_block_other_members() {
        let layer = ChannelLayer::new("chat", 1);
        let (slow, _slow_rx) = layer.new_channel();
        let (fast, mut fast_rx) = layer.new_channel();
        layer.join("general", &slow).await;
        layer.join("general", &fast).await;

        assert_eq!(layer.broadcast("general", event(1)).await, 2);
        let Some(first) = fast_rx.recv().await else {
            panic!("fast member missed first event");
        };
        assert_eq!(first, event(1));

        // slow never drained its single slot
        assert_eq!(layer.broadcast("general", event(2)).await, 1);
        assert_eq!(fast_rx.recv().await, Some(event(2)));
    }

    #[tokio::test]
    async fn dropped_inbox_is_skipped() {
        let layer = ChannelLayer::default();
        let (gone, gone_rx) = layer.new_channel();
        layer.join("general", &gone).await;
        drop(gone_rx);
        assert_eq!(layer.broadcast("general", event(1)).await, 0);
    }
}
