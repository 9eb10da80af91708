//! Notification relay configuration.

use serde::{Deserialize, Serialize};

/// Transport selection for the notification relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportPreference {
    /// Broadcast when a channel hub is available, otherwise the store signal.
    #[default]
    Auto,
    Broadcast,
    StoreSignal,
}

fn default_channel_name() -> String {
    String::from("psra-notifications")
}

fn default_fallback_key() -> String {
    String::from("psra_notification_fallback")
}

/// How long the store-signal transport keeps an envelope before deleting it.
const fn default_fallback_clear_ms() -> u64 {
    100
}

const fn default_capacity() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub transport: TransportPreference,

    /// Name of the origin-scoped broadcast channel.
    #[serde(default = "default_channel_name")]
    pub channel_name: String,

    /// Store key used by the store-signal transport.
    #[serde(default = "default_fallback_key")]
    pub fallback_key: String,

    #[serde(default = "default_fallback_clear_ms")]
    pub fallback_clear_ms: u64,

    /// Buffered messages per receiver before slow receivers start lagging.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            transport: TransportPreference::default(),
            channel_name: default_channel_name(),
            fallback_key: default_fallback_key(),
            fallback_clear_ms: default_fallback_clear_ms(),
            capacity: default_capacity(),
        }
    }
}
