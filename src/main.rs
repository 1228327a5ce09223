//! rtchat-gateway server entry point.
//!
//! Starts the Axum HTTP server with the chat WebSocket and REST endpoints.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use rtchat_gateway::api;
use rtchat_gateway::app_state::AppState;
use rtchat_gateway::config::{ChatConfig, LogFormat};
use rtchat_gateway::domain::ChannelLayer;
use rtchat_gateway::persistence::{MemoryStore, MessageStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ChatConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Plain => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting rtchat-gateway");

    // Build persistence layer
    let store: Arc<dyn MessageStore> = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        let store = PostgresStore::new(pool);
        store.migrate().await?;
        tracing::info!("postgres store ready");
        Arc::new(store)
    } else {
        tracing::warn!("persistence disabled, messages are kept in memory only");
        Arc::new(MemoryStore::new())
    };

    for room in &config.seed_rooms {
        let room = store.create_room(room).await?;
        tracing::info!(room = %room.name, id = room.id, "chat room available");
    }

    // Build application state
    let channel_layer = Arc::new(ChannelLayer::new(
        config.channel_prefix.clone(),
        config.channel_capacity,
    ));
    if config.users.is_empty() {
        tracing::warn!("CHAT_USERS is empty, every connection will be anonymous");
    }
    let app_state = AppState::new(store, channel_layer, Arc::new(config.users.clone()));

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
