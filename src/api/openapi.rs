//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers::{chatroom, system};

/// Generated OpenAPI description of all REST endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "rtchat-gateway",
        description = "Room info and message history for the WebSocket chat gateway."
    ),
    paths(
        system::health_handler,
        chatroom::get_chatroom,
        chatroom::list_messages,
    ),
    tags(
        (name = "System", description = "Service status"),
        (name = "Chat rooms", description = "Rooms and their message history"),
    )
)]
pub struct ApiDoc;
