//! Data Transfer Objects for REST request/response serialization.

pub mod chatroom_dto;
pub mod common_dto;

pub use chatroom_dto::*;
pub use common_dto::*;
