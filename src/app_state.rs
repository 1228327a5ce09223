//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::IdentityResolver;
use crate::domain::ChannelLayer;
use crate::persistence::MessageStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Room and message storage.
    pub store: Arc<dyn MessageStore>,
    /// Room membership and fan-out for WebSocket connections.
    pub channel_layer: Arc<ChannelLayer>,
    /// Token to identity mapping for incoming connections.
    pub identities: Arc<dyn IdentityResolver>,
}

impl AppState {
    /// Bundles the collaborators into an application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn MessageStore>,
        channel_layer: Arc<ChannelLayer>,
        identities: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            store,
            channel_layer,
            identities,
        }
    }
}
