//! Per-connection chat handler.
//!
//! [`ChatSocketHandler`] owns the session state of one WebSocket and
//! implements its four callbacks: connect, disconnect, receive and
//! group-event. The transport loop in [`super::connection`] drives the
//! callbacks one at a time; the handler itself never touches the socket.
//!
//! ```text
//! Connecting ──connect(authenticated)──▶ Open ──disconnect──▶ Closed
//!      └──────connect(anonymous / room missing)──────────────▶ Closed
//! ```

use std::sync::Arc;

use crate::domain::{ChatGroup, ConnectionChannel, RoomEvent, RoomRegistry, UserIdentity};
use crate::error::ChatError;
use crate::persistence::MessageStore;
use crate::render::render_message;

use super::messages::{ErrorFrame, InboundFrame};

/// Lifecycle phase of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Handler created, connect callback not yet completed.
    Connecting,
    /// Connection accepted; frames flow in both directions.
    Open,
    /// Rejected or disconnected. Terminal.
    Closed,
}

/// What the transport layer supplies when a connection arrives.
#[derive(Debug, Clone)]
pub struct ConnectContext {
    /// Identity resolved from the request credentials.
    pub user: UserIdentity,
    /// Room name from the URL path.
    pub room_name: String,
}

/// Result of the connect callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The user is authenticated; keep the connection open.
    Accepted,
    /// The user is anonymous; close the connection.
    Rejected,
}

/// Session state and callbacks for one chat connection.
#[derive(Debug)]
pub struct ChatSocketHandler {
    store: Arc<dyn MessageStore>,
    rooms: Arc<dyn RoomRegistry>,
    channel: ConnectionChannel,
    user: UserIdentity,
    room_name: Option<String>,
    room: Option<ChatGroup>,
    phase: ConnectionPhase,
}

impl ChatSocketHandler {
    /// Creates a handler for a connection whose channel is `channel`.
    #[must_use]
    pub fn new(
        store: Arc<dyn MessageStore>,
        rooms: Arc<dyn RoomRegistry>,
        channel: ConnectionChannel,
    ) -> Self {
        Self {
            store,
            rooms,
            channel,
            user: UserIdentity::Anonymous,
            room_name: None,
            room: None,
            phase: ConnectionPhase::Connecting,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    /// The room this connection joined, once connect found it.
    #[must_use]
    pub const fn room(&self) -> Option<&ChatGroup> {
        self.room.as_ref()
    }

    /// This connection's channel.
    #[must_use]
    pub const fn channel(&self) -> &ConnectionChannel {
        &self.channel
    }

    /// Connect callback.
    ///
    /// Looks the room up, joins this connection's channel to it, then
    /// accepts authenticated users and rejects anonymous ones. The join
    /// precedes the authentication check, so a rejected connection is a
    /// member until its disconnect callback runs.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::RoomNotFound`] if the room does not exist; the
    /// connection must then be rejected. Store failures propagate as-is.
    pub async fn on_connect(&mut self, ctx: ConnectContext) -> Result<ConnectOutcome, ChatError> {
        self.user = ctx.user;
        self.room_name = Some(ctx.room_name.clone());

        let room = match self.store.get_room(&ctx.room_name).await {
            Ok(room) => room,
            Err(err) => {
                self.phase = ConnectionPhase::Closed;
                return Err(err);
            }
        };

        self.rooms.join(&room.name, &self.channel).await;
        self.room = Some(room);

        if self.user.is_authenticated() {
            self.phase = ConnectionPhase::Open;
            tracing::info!(room = %ctx.room_name, channel = %self.channel.name(), user = %self.user, "connection accepted");
            Ok(ConnectOutcome::Accepted)
        } else {
            self.phase = ConnectionPhase::Closed;
            tracing::info!(room = %ctx.room_name, channel = %self.channel.name(), "anonymous connection rejected");
            Ok(ConnectOutcome::Rejected)
        }
    }

    /// Disconnect callback: leaves the room. Later calls do nothing.
    pub async fn on_disconnect(&mut self, close_code: u16) {
        if let Some(room_name) = self.room_name.take() {
            self.rooms.leave(&room_name, self.channel.name()).await;
            tracing::debug!(room = %room_name, channel = %self.channel.name(), close_code, "connection closed");
        }
        self.phase = ConnectionPhase::Closed;
    }

    /// Receive callback for one inbound text frame.
    ///
    /// For an authenticated user with a non-empty body the message is
    /// persisted and, once stored, a [`RoomEvent::Message`] is broadcast to
    /// the room (sender included); nothing is returned. Otherwise the
    /// returned text is the error frame to send back to this connection.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MalformedFrame`] for unparseable input, and
    /// propagates store failures.
    pub async fn on_receive(&self, raw: &str) -> Result<Option<String>, ChatError> {
        let frame = InboundFrame::parse(raw)?;

        let (Some(body), Some(author)) = (frame.non_empty_body(), self.user.user()) else {
            tracing::debug!(channel = %self.channel.name(), user = %self.user, "rejected empty or unauthenticated message");
            return Ok(Some(ErrorFrame::auth_or_empty().to_json()));
        };

        let room = self.room.as_ref().ok_or_else(|| {
            ChatError::Internal("message received before the room was joined".to_string())
        })?;

        let message = self.store.create_message(body, author, room).await?;
        let delivered = self
            .rooms
            .broadcast(
                &room.name,
                RoomEvent::Message {
                    message_id: message.id,
                },
            )
            .await;

        tracing::debug!(room = %room.name, message_id = %message.id, delivered, "message broadcast");
        Ok(None)
    }

    /// Group-event callback for one event fanned out to this connection.
    ///
    /// Returns the text frame to send: the message rendered for this
    /// connection's user.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`] if the event refers to a
    /// message the store does not have.
    pub async fn on_group_event(&self, event: RoomEvent) -> Result<String, ChatError> {
        match event {
            RoomEvent::Message { message_id } => {
                let message = self.store.get_message(message_id).await?;
                Ok(render_message(&message, &self.user).into_string())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::domain::channel::{self, ChannelInbox};
    use crate::domain::{ChannelLayer, ChannelName, MessageId, UserRef};
    use crate::persistence::MemoryStore;
    use crate::ws::messages::AUTH_OR_EMPTY_ERROR;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Join(String),
        Leave(String),
        Broadcast(String, RoomEvent),
    }

    /// Registry that only records what it was asked to do.
    #[derive(Debug, Default)]
    struct RecordingRegistry {
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingRegistry {
        async fn calls(&self) -> Vec<Call> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl RoomRegistry for RecordingRegistry {
        async fn join(&self, room: &str, _channel: &ConnectionChannel) {
            self.calls.lock().await.push(Call::Join(room.to_string()));
        }

        async fn leave(&self, room: &str, _channel: &ChannelName) {
            self.calls.lock().await.push(Call::Leave(room.to_string()));
        }

        async fn broadcast(&self, room: &str, event: RoomEvent) -> usize {
            self.calls
                .lock()
                .await
                .push(Call::Broadcast(room.to_string(), event));
            1
        }
    }

    fn alice() -> UserIdentity {
        UserIdentity::Authenticated(UserRef::new(1, "alice"))
    }

    fn bob() -> UserIdentity {
        UserIdentity::Authenticated(UserRef::new(2, "bob"))
    }

    fn ctx(user: UserIdentity, room: &str) -> ConnectContext {
        ConnectContext {
            user,
            room_name: room.to_string(),
        }
    }

    async fn recording_setup() -> (Arc<MemoryStore>, Arc<RecordingRegistry>, ChatSocketHandler) {
        let store = Arc::new(MemoryStore::with_rooms(["general"]).await);
        let registry = Arc::new(RecordingRegistry::default());
        let (chan, _inbox) = channel::channel("test", 8);
        let handler = ChatSocketHandler::new(
            Arc::clone(&store) as Arc<dyn MessageStore>,
            Arc::clone(&registry) as Arc<dyn RoomRegistry>,
            chan,
        );
        (store, registry, handler)
    }

    fn layer_handler(
        store: &Arc<MemoryStore>,
        layer: &Arc<ChannelLayer>,
    ) -> (ChatSocketHandler, ChannelInbox) {
        let (chan, inbox) = layer.new_channel();
        let handler = ChatSocketHandler::new(
            Arc::clone(store) as Arc<dyn MessageStore>,
            Arc::clone(layer) as Arc<dyn RoomRegistry>,
            chan,
        );
        (handler, inbox)
    }

    #[tokio::test]
    async fn authenticated_connect_is_accepted_and_joined() {
        let (_store, registry, mut handler) = recording_setup().await;

        let outcome = handler.on_connect(ctx(alice(), "general")).await;
        assert!(matches!(outcome, Ok(ConnectOutcome::Accepted)));
        assert_eq!(handler.phase(), ConnectionPhase::Open);
        assert_eq!(handler.room().map(|r| r.name.as_str()), Some("general"));
        assert_eq!(registry.calls().await, vec![Call::Join("general".to_string())]);
    }

    #[tokio::test]
    async fn anonymous_connect_joins_then_is_rejected() {
        let (_store, registry, mut handler) = recording_setup().await;

        let outcome = handler.on_connect(ctx(UserIdentity::Anonymous, "general")).await;
        assert!(matches!(outcome, Ok(ConnectOutcome::Rejected)));
        assert_eq!(handler.phase(), ConnectionPhase::Closed);
        assert_eq!(registry.calls().await, vec![Call::Join("general".to_string())]);

        handler.on_disconnect(4403).await;
        assert_eq!(
            registry.calls().await,
            vec![
                Call::Join("general".to_string()),
                Call::Leave("general".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn unknown_room_fails_without_join() {
        let (_store, registry, mut handler) = recording_setup().await;

        let outcome = handler.on_connect(ctx(alice(), "nowhere")).await;
        assert!(matches!(outcome, Err(ChatError::RoomNotFound(name)) if name == "nowhere"));
        assert_eq!(handler.phase(), ConnectionPhase::Closed);
        assert!(registry.calls().await.is_empty());
    }

    #[tokio::test]
    async fn disconnect_leaves_exactly_once() {
        let (_store, registry, mut handler) = recording_setup().await;
        let _ = handler.on_connect(ctx(alice(), "general")).await;

        handler.on_disconnect(1000).await;
        handler.on_disconnect(1000).await;

        let leaves = registry
            .calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, Call::Leave(_)))
            .count();
        assert_eq!(leaves, 1);
        assert_eq!(handler.phase(), ConnectionPhase::Closed);
    }

    #[tokio::test]
    async fn receive_persists_then_broadcasts_once() {
        let (store, registry, mut handler) = recording_setup().await;
        let _ = handler.on_connect(ctx(alice(), "general")).await;

        let reply = handler.on_receive(r#"{"body": "hello"}"#).await;
        assert!(matches!(reply, Ok(None)));
        assert_eq!(store.message_count().await, 1);

        let Ok(stored) = store.get_message(MessageId::new(1)).await else {
            panic!("message was not persisted");
        };
        assert_eq!(stored.body, "hello");
        assert_eq!(stored.author, UserRef::new(1, "alice"));
        assert_eq!(stored.group_name, "general");

        assert_eq!(
            registry.calls().await,
            vec![
                Call::Join("general".to_string()),
                Call::Broadcast(
                    "general".to_string(),
                    RoomEvent::Message {
                        message_id: stored.id
                    }
                ),
            ]
        );
    }

    #[tokio::test]
    async fn empty_body_gets_error_frame_only() {
        let (store, registry, mut handler) = recording_setup().await;
        let _ = handler.on_connect(ctx(alice(), "general")).await;

        let reply = handler.on_receive(r#"{"body": ""}"#).await;
        let Ok(Some(text)) = reply else {
            panic!("expected an error frame");
        };
        let Ok(frame) = serde_json::from_str::<ErrorFrame>(&text) else {
            panic!("error frame is not JSON");
        };
        assert_eq!(frame.error, AUTH_OR_EMPTY_ERROR);
        assert_eq!(store.message_count().await, 0);
        assert_eq!(registry.calls().await, vec![Call::Join("general".to_string())]);
    }

    #[tokio::test]
    async fn anonymous_receive_gets_error_frame_only() {
        let (store, registry, mut handler) = recording_setup().await;
        let _ = handler.on_connect(ctx(UserIdentity::Anonymous, "general")).await;

        for raw in ["{}", r#"{"body": "hello"}"#] {
            let reply = handler.on_receive(raw).await;
            assert!(matches!(reply, Ok(Some(_))), "no error frame for {raw}");
        }
        assert_eq!(store.message_count().await, 0);
        assert_eq!(registry.calls().await, vec![Call::Join("general".to_string())]);
    }

    #[tokio::test]
    async fn numeric_body_is_posted_as_text() {
        let (store, _registry, mut handler) = recording_setup().await;
        let _ = handler.on_connect(ctx(alice(), "general")).await;

        let reply = handler.on_receive(r#"{"body": 5}"#).await;
        assert!(matches!(reply, Ok(None)));
        let Ok(stored) = store.get_message(MessageId::new(1)).await else {
            panic!("message was not persisted");
        };
        assert_eq!(stored.body, "5");
    }

    #[tokio::test]
    async fn falsy_body_gets_error_frame_and_stays_open() {
        let (store, _registry, mut handler) = recording_setup().await;
        let _ = handler.on_connect(ctx(alice(), "general")).await;

        let reply = handler.on_receive(r#"{"body": false}"#).await;
        let Ok(Some(text)) = reply else {
            panic!("expected an error frame");
        };
        assert!(text.contains(AUTH_OR_EMPTY_ERROR));
        assert_eq!(store.message_count().await, 0);
        assert_eq!(handler.phase(), ConnectionPhase::Open);
    }

    #[tokio::test]
    async fn malformed_frame_is_an_error() {
        let (store, _registry, mut handler) = recording_setup().await;
        let _ = handler.on_connect(ctx(alice(), "general")).await;

        let reply = handler.on_receive("not json").await;
        assert!(matches!(reply, Err(ChatError::MalformedFrame(_))));
        assert_eq!(store.message_count().await, 0);
    }

    #[tokio::test]
    async fn group_event_for_missing_message_fails() {
        let (_store, _registry, mut handler) = recording_setup().await;
        let _ = handler.on_connect(ctx(alice(), "general")).await;

        let result = handler
            .on_group_event(RoomEvent::Message {
                message_id: MessageId::new(404),
            })
            .await;
        assert!(matches!(result, Err(ChatError::MessageNotFound(_))));
    }

    #[tokio::test]
    async fn fan_out_renders_per_recipient() {
        let store = Arc::new(MemoryStore::with_rooms(["general"]).await);
        let layer = Arc::new(ChannelLayer::new("test", 8));
        let (mut sender, mut sender_inbox) = layer_handler(&store, &layer);
        let (mut peer, mut peer_inbox) = layer_handler(&store, &layer);

        let _ = sender.on_connect(ctx(alice(), "general")).await;
        let _ = peer.on_connect(ctx(bob(), "general")).await;
        assert_eq!(layer.member_count("general").await, 2);

        let reply = sender.on_receive(r#"{"body": "hello"}"#).await;
        assert!(matches!(reply, Ok(None)));

        let (Some(to_sender), Some(to_peer)) = (sender_inbox.recv().await, peer_inbox.recv().await)
        else {
            panic!("both members should receive the event");
        };
        assert_eq!(to_sender, to_peer);

        let (Ok(own), Ok(other)) = (
            sender.on_group_event(to_sender).await,
            peer.on_group_event(to_peer).await,
        ) else {
            panic!("rendering failed");
        };
        assert!(own.contains("chat-message own"));
        assert!(other.contains(r#"<span class="author">alice</span>"#));
        assert_ne!(own, other);

        sender.on_disconnect(1000).await;
        peer.on_disconnect(1000).await;
        assert_eq!(layer.member_count("general").await, 0);
    }
}
