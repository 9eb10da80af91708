//! Notification over a shared key/value store.
//!
//! The sender writes the envelope under the signal key and removes it shortly
//! after; other sessions observe the write through the store's change feed.
//! Backends without a change feed can post but never receive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use psra_config::RelayConfig;
use psra_store::KeyValueStore;
use serde_json::Value;

use super::{Inbound, Transport, TransportKind};
use crate::error::RelayError;

pub struct StoreSignalTransport {
    store: Arc<dyn KeyValueStore>,
    key: String,
    clear_after: Duration,
    closed: AtomicBool,
}

impl std::fmt::Debug for StoreSignalTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSignalTransport")
            .field("key", &self.key)
            .field("clear_after", &self.clear_after)
            .finish_non_exhaustive()
    }
}

impl StoreSignalTransport {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, config: &RelayConfig) -> Self {
        Self {
            store,
            key: config.fallback_key.clone(),
            clear_after: Duration::from_millis(config.fallback_clear_ms),
            closed: AtomicBool::new(false),
        }
    }

    /// Remove the signal after the delay on the current runtime, or right
    /// away when there is none.
    fn schedule_clear(&self) {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let clear = move || {
            if let Err(error) = store.remove(&key) {
                tracing::warn!(%key, %error, "failed to clear store signal");
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let delay = self.clear_after;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    clear();
                });
            }
            Err(_) => clear(),
        }
    }
}

impl Transport for StoreSignalTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::StoreSignal
    }

    fn post(&self, message: &Value) -> Result<(), RelayError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RelayError::Closed);
        }
        let raw = serde_json::to_string(message)?;
        self.store.set(&self.key, &raw).map_err(|err| RelayError::Post {
            transport: TransportKind::StoreSignal,
            reason: err.to_string(),
        })?;
        self.schedule_clear();
        Ok(())
    }

    fn subscribe(&self) -> Inbound {
        match self.store.watch() {
            Some(feed) => Inbound::Store {
                feed,
                key: self.key.clone(),
            },
            None => {
                tracing::debug!(key = %self.key, "store has no change feed; receiving disabled");
                Inbound::Idle
            }
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_healthy(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }
}
