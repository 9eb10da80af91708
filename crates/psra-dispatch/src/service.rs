//! Service layer for dispatch operations.
//!
//! `DispatchService` wraps a `CollectionStore` (transactional access to the
//! shared collections) and an optional `NotificationRelay`. All entity
//! operations are implemented as `impl DispatchService` blocks in `repos/`.

use std::sync::Arc;
use std::time::Duration;

use psra_config::{DispatchConfig, PsraConfig, StoreBackend, StoreConfig};
use psra_relay::{Notification, NotificationRelay};
use psra_store::{CollectionStore, FileStore, KeyValueStore, MemoryStore, StoreError};

/// Open the backend named by `config`.
///
/// # Errors
///
/// `StoreError::Io` if the file backend's directory cannot be created.
pub fn open_backend(config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    Ok(match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(FileStore::open(&config.path)?),
    })
}

/// Orchestrates dispatch mutations and broadcasts their outcome.
///
/// Every mutation follows this protocol:
/// 1. Take the store writer lock and read the collections it touches
/// 2. Check preconditions and apply the change
/// 3. Commit
/// 4. Send notifications (failures are logged, never returned)
pub struct DispatchService {
    store: CollectionStore,
    relay: Option<Arc<NotificationRelay>>,
    config: DispatchConfig,
}

impl std::fmt::Debug for DispatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchService")
            .field("store", &self.store)
            .field("relay", &self.relay)
            .field("config", &self.config)
            .finish()
    }
}

impl DispatchService {
    #[must_use]
    pub const fn new(store: CollectionStore, config: DispatchConfig) -> Self {
        Self {
            store,
            relay: None,
            config,
        }
    }

    /// Build from loaded configuration over an already opened backend.
    #[must_use]
    pub fn from_config(backend: Arc<dyn KeyValueStore>, config: &PsraConfig) -> Self {
        let store = CollectionStore::new(backend)
            .with_lock_timeout(Duration::from_millis(config.store.lock_timeout_ms));
        Self::new(store, config.dispatch.clone())
    }

    #[must_use]
    pub fn with_relay(mut self, relay: Arc<NotificationRelay>) -> Self {
        self.relay = Some(relay);
        self
    }

    #[must_use]
    pub const fn store(&self) -> &CollectionStore {
        &self.store
    }

    #[must_use]
    pub const fn relay(&self) -> Option<&Arc<NotificationRelay>> {
        self.relay.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// `name` trimmed, or the configured default actor when blank.
    pub(crate) fn actor_or_default(&self, name: &str) -> String {
        let name = name.trim();
        if name.is_empty() {
            self.config.default_actor.clone()
        } else {
            name.to_string()
        }
    }

    /// Best-effort broadcast of a committed change.
    pub(crate) fn notify(&self, notification: &Notification) {
        let Some(relay) = &self.relay else {
            return;
        };
        if let Err(error) = relay.send(notification) {
            tracing::warn!(
                notification_type = %notification.kind(),
                %error,
                "failed to send notification"
            );
        }
    }
}
