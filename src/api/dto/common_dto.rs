//! Shared DTO types used across multiple endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

/// Default number of messages returned by history endpoints.
pub const DEFAULT_HISTORY_LIMIT: u32 = 30;

/// Upper bound on messages returned by history endpoints.
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Query parameters for message history endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct HistoryParams {
    /// Number of most recent messages to return (1–100). Defaults to 30.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_HISTORY_LIMIT
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl HistoryParams {
    /// Clamps `limit` to `1..=100`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_HISTORY_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_limit() {
        assert_eq!(HistoryParams { limit: 0 }.clamped().limit, 1);
        assert_eq!(HistoryParams { limit: 500 }.clamped().limit, 100);
        assert_eq!(HistoryParams::default().clamped().limit, 30);
    }
}
