//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::run_connection;
use super::consumer::{ChatSocketHandler, ConnectContext};
use crate::app_state::AppState;
use crate::auth::request_token;
use crate::domain::RoomRegistry;

/// Query parameters accepted on the WebSocket endpoint.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Optional access token; browsers cannot set headers on WebSockets.
    #[serde(default)]
    pub token: Option<String>,
}

/// `GET /ws/chatroom/{chatroom_name}` — Upgrade to a chat connection.
pub async fn chatroom_ws_handler(
    ws: WebSocketUpgrade,
    Path(chatroom_name): Path<String>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let token = request_token(query.token.as_deref(), &headers);
    let user = state.identities.resolve(token);

    let (channel, inbox) = state.channel_layer.new_channel();
    let rooms = Arc::clone(&state.channel_layer) as Arc<dyn RoomRegistry>;
    let handler = ChatSocketHandler::new(Arc::clone(&state.store), rooms, channel);
    let ctx = ConnectContext {
        user,
        room_name: chatroom_name,
    };

    ws.on_upgrade(move |socket| run_connection(socket, handler, inbox, ctx))
}
