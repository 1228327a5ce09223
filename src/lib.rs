//! # rtchat-gateway
//!
//! WebSocket group-chat gateway. Clients connect to a named room, post
//! `{"body": "..."}` frames, and receive every room message as an HTML
//! fragment rendered for them.
//!
//! Each connection is served by a [`ws::consumer::ChatSocketHandler`] that
//! persists incoming messages and only then fans the new message id out to
//! the room through the [`domain::RoomRegistry`].
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── WS Handler (ws/)  ── ChatSocketHandler per connection
//!     ├── REST Handlers (api/)
//!     │
//!     ├── ChannelLayer: room membership + fan-out (domain/)
//!     ├── Renderer (render)
//!     │
//!     └── MessageStore: PostgreSQL or in-memory (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod render;
pub mod ws;
