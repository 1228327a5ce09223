//! WebSocket frame types: inbound chat frames, error replies, close codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChatError;

/// Text of the error frame sent when a message is rejected.
pub const AUTH_OR_EMPTY_ERROR: &str = "Authentication failed or empty message.";

/// Close codes sent by the server.
pub mod close_code {
    /// Connection rejected: the user is not authenticated.
    pub const UNAUTHORIZED: u16 = 4403;
    /// Connection rejected: the requested room does not exist.
    pub const ROOM_NOT_FOUND: u16 = 4404;
    /// A callback failed and the connection was terminated.
    pub const INTERNAL_ERROR: u16 = 1011;
    /// The peer went away without a close frame.
    pub const ABNORMAL: u16 = 1006;
    /// The peer's close frame carried no status code.
    pub const NO_STATUS: u16 = 1005;
}

/// Client → server chat frame: `{"body": "<text>"}`.
///
/// Other fields are ignored. A body that is missing or falsy (`null`,
/// `false`, `0`, `""`, `[]`, `{}`) is `None`. Any other non-string body is
/// kept as its JSON text, so `{"body": 5}` posts `5`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundFrame {
    /// Message text, if any.
    pub body: Option<String>,
}

impl InboundFrame {
    /// Parses a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MalformedFrame`] if the text is not JSON or is
    /// not a JSON object.
    pub fn parse(raw: &str) -> Result<Self, ChatError> {
        let Value::Object(mut fields) = serde_json::from_str(raw)? else {
            return Err(ChatError::MalformedFrame(
                "expected a JSON object".to_string(),
            ));
        };
        let body = fields.remove("body").and_then(body_text);
        Ok(Self { body })
    }

    /// Returns the body if it is present and non-empty.
    #[must_use]
    pub fn non_empty_body(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }
}

/// Text of a `body` value, or `None` when the value is falsy.
fn body_text(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) => Some(text),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Server → client error frame: `{"error": "<text>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrame {
    /// Error text shown to the user.
    pub error: String,
}

impl ErrorFrame {
    /// The frame sent when a message is unauthenticated or empty.
    #[must_use]
    pub fn auth_or_empty() -> Self {
        Self {
            error: AUTH_OR_EMPTY_ERROR.to_string(),
        }
    }

    /// Serializes the frame to its JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::json!({ "error": self.error }).to_string()
    }
}
