//! Chat room handlers: room info and message history.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ChatRoomResponse, HistoryParams, MessageDto, MessageHistoryResponse};
use crate::app_state::AppState;
use crate::error::{ChatError, ErrorResponse};

/// `GET /chatrooms/{chatroom_name}` — Room details.
///
/// # Errors
///
/// Returns [`ChatError::RoomNotFound`] if the room does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/chatrooms/{chatroom_name}",
    tag = "Chat rooms",
    summary = "Get a chat room",
    description = "Returns the room id, name and the number of connections currently joined to it.",
    params(("chatroom_name" = String, Path, description = "Room name")),
    responses(
        (status = 200, description = "Room details", body = ChatRoomResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn get_chatroom(
    State(state): State<AppState>,
    Path(chatroom_name): Path<String>,
) -> Result<impl IntoResponse, ChatError> {
    let room = state.store.get_room(&chatroom_name).await?;
    let member_count = state.channel_layer.member_count(&room.name).await;

    Ok(Json(ChatRoomResponse {
        id: room.id,
        name: room.name,
        member_count,
    }))
}

/// `GET /chatrooms/{chatroom_name}/messages` — Recent message history.
///
/// # Errors
///
/// Returns [`ChatError::InvalidRequest`] for a bad query string,
/// [`ChatError::RoomNotFound`] if the room does not exist, or a
/// [`ChatError::PersistenceError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/chatrooms/{chatroom_name}/messages",
    tag = "Chat rooms",
    summary = "List recent messages",
    description = "Returns the most recent messages of a room, oldest first.",
    params(("chatroom_name" = String, Path, description = "Room name"), HistoryParams),
    responses(
        (status = 200, description = "Message history", body = MessageHistoryResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(chatroom_name): Path<String>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<impl IntoResponse, ChatError> {
    let Query(params) = params?;
    let params = params.clamped();
    let room = state.store.get_room(&chatroom_name).await?;
    let messages = state.store.recent_messages(&room, params.limit).await?;

    Ok(Json(MessageHistoryResponse {
        chatroom: room.name,
        data: messages.into_iter().map(MessageDto::from).collect(),
    }))
}

/// Chat room routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chatrooms/{chatroom_name}", get(get_chatroom))
        .route("/chatrooms/{chatroom_name}/messages", get(list_messages))
}
