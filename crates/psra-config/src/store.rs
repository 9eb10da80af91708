//! Store backend configuration.

use serde::{Deserialize, Serialize};

/// Which key/value backend holds the collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local; sessions attached to the same store share it.
    Memory,
    /// One JSON file per key under `path`.
    #[default]
    File,
}

fn default_path() -> String {
    String::from(".psra/store")
}

/// Default wait for the store writer lock, in milliseconds.
const fn default_lock_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory for the file backend.
    #[serde(default = "default_path")]
    pub path: String,

    /// How long a mutation waits for the writer lock before failing.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_path(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}
