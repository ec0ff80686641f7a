//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound buffer size per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Key required in the `key` header of `POST /update`.
    #[serde(default = "default_update_key")]
    pub update_key: String,
    /// Path prefix whose next segment names the subscribed resource.
    #[serde(default = "default_resource_prefix")]
    pub resource_path_prefix: String,
    /// Whether to mirror connection records into the document store.
    #[serde(default = "default_true")]
    pub persist_connections: bool,
}

impl RealtimeConfig {
    /// Validates the realtime section at startup.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.channel_buffer_size == 0 {
            return Err(AppError::configuration(
                "realtime.channel_buffer_size must be greater than zero",
            ));
        }
        if self.update_key.is_empty() {
            return Err(AppError::configuration("realtime.update_key must not be empty"));
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            update_key: default_update_key(),
            resource_path_prefix: default_resource_prefix(),
            persist_connections: true,
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_update_key() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_resource_prefix() -> String {
    "/products/".to_string()
}

fn default_true() -> bool {
    true
}
