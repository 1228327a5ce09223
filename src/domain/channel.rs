//! Per-connection channels: the addressable inbox of one WebSocket.

use std::fmt;

use tokio::sync::mpsc;

use super::RoomEvent;

/// Unique name of one connection's channel, e.g. `chat.3f6c…`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelName(String);

impl ChannelName {
    /// Generates a fresh channel name under `prefix`.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}.{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sending half of a connection's channel, registered with rooms on join.
#[derive(Debug, Clone)]
pub struct ConnectionChannel {
    name: ChannelName,
    sender: mpsc::Sender<RoomEvent>,
}

impl ConnectionChannel {
    /// Returns the channel's name.
    #[must_use]
    pub const fn name(&self) -> &ChannelName {
        &self.name
    }

    /// Enqueues an event without waiting.
    ///
    /// # Errors
    ///
    /// Returns the [`mpsc::error::TrySendError`] when the inbox is full or
    /// its receiver has been dropped.
    pub fn try_deliver(&self, event: RoomEvent) -> Result<(), mpsc::error::TrySendError<RoomEvent>> {
        self.sender.try_send(event)
    }
}

/// Receiving half of a connection's channel, drained by the connection loop.
#[derive(Debug)]
pub struct ChannelInbox {
    receiver: mpsc::Receiver<RoomEvent>,
}

impl ChannelInbox {
    /// Waits for the next event. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<RoomEvent> {
        self.receiver.recv().await
    }

    /// Returns the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<RoomEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Creates a connected channel/inbox pair holding up to `capacity` events.
#[must_use]
pub fn channel(prefix: &str, capacity: usize) -> (ConnectionChannel, ChannelInbox) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        ConnectionChannel {
            name: ChannelName::generate(prefix),
            sender,
        },
        ChannelInbox { receiver },
    )
}
