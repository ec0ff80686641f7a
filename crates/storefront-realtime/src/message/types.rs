//! Inbound and outbound WebSocket message type definitions.

use serde::{Deserialize, Serialize};

/// Events sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Identify the socket with an access token.
    Authenticated {
        /// Access token.
        token: String,
    },
    /// The client navigated to a new path.
    Routing {
        /// New path or full URL.
        url: String,
    },
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A watched resource changed.
    Update {
        /// Identifier of the updated resource.
        resource_id: String,
        /// The updated resource.
        payload: serde_json::Value,
    },
    /// The last client event could not be processed.
    Error {
        /// Machine-readable error code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl OutboundMessage {
    /// Builds an error event.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}
