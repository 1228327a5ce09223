//! WebSocket layer: chat connections.
//!
//! The endpoint at `/ws/chatroom/{chatroom_name}` joins a room, accepts
//! `{"body": "..."}` frames from authenticated users, and pushes every
//! room message to each member as an HTML fragment.

pub mod connection;
pub mod consumer;
pub mod handler;
pub mod messages;
