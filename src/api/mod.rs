//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; system endpoints and
//! the WebSocket endpoint live at the root.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;
use crate::ws::handler::chatroom_ws_handler;

/// Builds the complete router: REST endpoints, the chat WebSocket and,
/// with the `swagger-ui` feature, the API docs at `/swagger-ui`.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .route("/ws/chatroom/{chatroom_name}", get(chatroom_ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi as _;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}
