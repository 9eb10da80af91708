//! In-process backend.
//!
//! A [`MemoryStore`] and every session created from it with
//! [`MemoryStore::attach`] share one map, one writer lock and one change
//! channel, the way tabs of one origin share browser storage.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, TryLockError};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::{ChangeFeed, KeyValueStore, SessionId, StoreChange, StoreError, WriteGuard, check_key};

const CHANGE_CAPACITY: usize = 256;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct Shared {
    entries: RwLock<BTreeMap<String, String>>,
    writer: Mutex<()>,
    changes: broadcast::Sender<StoreChange>,
    next_session: AtomicU64,
}

/// One session of a shared in-memory store.
#[derive(Debug)]
pub struct MemoryStore {
    shared: Arc<Shared>,
    session: SessionId,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(BTreeMap::new()),
                writer: Mutex::new(()),
                changes,
                next_session: AtomicU64::new(1),
            }),
            session: 0,
        }
    }

    /// A new session over the same data.
    #[must_use]
    pub fn attach(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            session: self.shared.next_session.fetch_add(1, Ordering::Relaxed),
        }
    }

    #[must_use]
    pub const fn session(&self) -> SessionId {
        self.session
    }

    fn publish(&self, key: &str, new_value: Option<String>) {
        // No receivers is fine.
        let _ = self.shared.changes.send(StoreChange {
            key: key.to_string(),
            new_value,
            origin: self.session,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        let entries = self
            .shared
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.shared
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self.publish(key, Some(value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        let removed = self
            .shared
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed.is_some() {
            self.publish(key, None);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self
            .shared
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(entries.keys().cloned().collect())
    }

    fn lock(&self, timeout: Duration) -> Result<WriteGuard<'_>, StoreError> {
        let started = Instant::now();
        loop {
            match self.shared.writer.try_lock() {
                Ok(guard) => return Ok(WriteGuard::Memory(guard)),
                // The lock guards no data, so a panicked holder leaves nothing torn.
                Err(TryLockError::Poisoned(poisoned)) => {
                    return Ok(WriteGuard::Memory(poisoned.into_inner()));
                }
                Err(TryLockError::WouldBlock) => {
                    let waited = started.elapsed();
                    if waited >= timeout {
                        return Err(StoreError::LockTimeout {
                            waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                            holder: None,
                        });
                    }
                    std::thread::sleep(LOCK_RETRY_DELAY);
                }
            }
        }
    }

    fn watch(&self) -> Option<ChangeFeed> {
        Some(ChangeFeed::new(self.shared.changes.subscribe(), self.session))
    }
}
