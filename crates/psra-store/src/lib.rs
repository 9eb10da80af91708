//! # psra-store
//!
//! Key/value storage for the dispatch collections.
//!
//! Every backend implements [`KeyValueStore`]: string keys, JSON string
//! values, an exclusive writer lock shared by all sessions of the same store,
//! and (where the backend can deliver it) a feed of changes made by other
//! sessions.
//!
//! [`CollectionStore`] layers typed JSON access on top and runs
//! read-modify-write mutations as [`Transaction`]s under the writer lock, so
//! two sessions racing on the same collection cannot lose each other's writes.

pub mod collections;
pub mod error;
pub mod file;
pub mod lock;
pub mod memory;

pub use collections::{CollectionStore, Transaction};
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::MutexGuard;
use std::time::Duration;

use tokio::sync::broadcast;

/// Identifies one session (tab, process, handle) attached to a store.
pub type SessionId = u64;

/// A single key written or removed by some session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
    pub origin: SessionId,
}

/// Exclusive writer lock. Released on drop.
#[derive(Debug)]
pub enum WriteGuard<'a> {
    Memory(MutexGuard<'a, ()>),
    File(lock::LockFileGuard),
}

/// Synchronous key/value backend.
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Backend I/O failures or an invalid key.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    ///
    /// Backend I/O failures or an invalid key.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Backend I/O failures or an invalid key.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// All keys currently present, sorted.
    ///
    /// # Errors
    ///
    /// Backend I/O failures.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Acquire the writer lock shared by every session of this store.
    ///
    /// # Errors
    ///
    /// `StoreError::LockTimeout` when the lock stays held past `timeout`.
    fn lock(&self, timeout: Duration) -> Result<WriteGuard<'_>, StoreError>;

    /// Changes made by other sessions, or `None` when the backend has no
    /// change notification.
    fn watch(&self) -> Option<ChangeFeed>;
}

/// Receiver of changes from other sessions. Own writes are filtered out.
#[derive(Debug)]
pub struct ChangeFeed {
    rx: broadcast::Receiver<StoreChange>,
    session: SessionId,
}

impl ChangeFeed {
    pub(crate) const fn new(rx: broadcast::Receiver<StoreChange>, session: SessionId) -> Self {
        Self { rx, session }
    }

    /// Wait for the next foreign change. `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<StoreChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.origin == self.session => {}
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "store change feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered foreign change, without waiting.
    pub fn try_recv(&mut self) -> Option<StoreChange> {
        loop {
            match self.rx.try_recv() {
                Ok(change) if change.origin == self.session => {}
                Ok(change) => return Some(change),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "store change feed lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

/// Keys are used as file names by the file backend.
pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
