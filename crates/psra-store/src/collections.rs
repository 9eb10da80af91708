//! Typed JSON collections over a [`KeyValueStore`].
//!
//! Plain reads are lock-free snapshots and treat an unreadable value as an
//! empty collection (logged). Mutations run inside [`CollectionStore::transact`]:
//! the writer lock is held for the whole closure, reads see the transaction's
//! own pending writes, and nothing is written unless the closure returns `Ok`.
//! Inside a transaction an unreadable value is an error, so a mutation never
//! replaces data it could not parse.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{KeyValueStore, StoreError};

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct CollectionStore {
    backend: Arc<dyn KeyValueStore>,
    lock_timeout: Duration,
}

impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("lock_timeout", &self.lock_timeout)
            .finish_non_exhaustive()
    }
}

impl CollectionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    /// Snapshot read. Missing or corrupt values read as `T::default()`.
    ///
    /// # Errors
    ///
    /// Only backend I/O failures.
    pub fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        let raw = self.backend.get(key)?;
        Ok(decode(key, raw.as_deref()).unwrap_or_else(|err| {
            tracing::error!(key, error = %err, "unreadable collection, using empty value");
            T::default()
        }))
    }

    /// Run `f` as one atomic read-modify-write.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, or a `StoreError` (converted into `E`) from lock
    /// acquisition or commit.
    pub fn transact<R, E, F>(&self, f: F) -> Result<R, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Transaction<'_>) -> Result<R, E>,
    {
        let _guard = self.backend.lock(self.lock_timeout)?;
        let mut tx = Transaction {
            backend: self.backend.as_ref(),
            pending: BTreeMap::new(),
        };
        let out = f(&mut tx)?;
        tx.commit()?;
        Ok(out)
    }
}

/// Buffered writes of one [`CollectionStore::transact`] call.
pub struct Transaction<'s> {
    backend: &'s dyn KeyValueStore,
    pending: BTreeMap<String, Option<String>>,
}

impl Transaction<'_> {
    /// Read through pending writes. Missing values read as `T::default()`.
    ///
    /// # Errors
    ///
    /// `StoreError::Corrupt` if the stored value does not decode, or backend
    /// I/O failures.
    pub fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        match self.pending.get(key) {
            Some(staged) => decode(key, staged.as_deref()),
            None => decode(key, self.backend.get(key)?.as_deref()),
        }
    }

    /// Stage `value` for `key`.
    ///
    /// # Errors
    ///
    /// `StoreError::Encode` if the value does not serialize.
    pub fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|err| StoreError::Encode {
            key: key.to_string(),
            reason: err.to_string(),
        })?;
        self.pending.insert(key.to_string(), Some(json));
        Ok(())
    }

    /// Stage removal of `key`.
    pub fn remove(&mut self, key: &str) {
        self.pending.insert(key.to_string(), None);
    }

    /// Keys present once pending writes apply, sorted.
    ///
    /// # Errors
    ///
    /// Backend I/O failures.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .backend
            .keys()?
            .into_iter()
            .filter(|key| !matches!(self.pending.get(key), Some(None)))
            .collect();
        for (key, staged) in &self.pending {
            if staged.is_some() && !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys.sort_unstable();
        Ok(keys)
    }

    fn commit(self) -> Result<(), StoreError> {
        for (key, staged) in &self.pending {
            match staged {
                Some(value) => self.backend.set(key, value)?,
                None => self.backend.remove(key)?,
            }
        }
        if !self.pending.is_empty() {
            tracing::trace!(keys = self.pending.len(), "committed store transaction");
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned + Default>(key: &str, raw: Option<&str>) -> Result<T, StoreError> {
    match raw {
        None => Ok(T::default()),
        Some(raw) if raw.trim().is_empty() => Ok(T::default()),
        Some(raw) => serde_json::from_str(raw).map_err(|err| StoreError::Corrupt {
            key: key.to_string(),
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use pretty_assertions::assert_eq;

    fn store() -> (Arc<MemoryStore>, CollectionStore) {
        let backend = Arc::new(MemoryStore::new());
        let collections = CollectionStore::new(backend.clone());
        (backend, collections)
    }

    #[test]
    fn missing_key_reads_as_empty() {
        let (_, collections) = store();
        let values: Vec<u32> = collections.read("psra_incidents").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn corrupt_snapshot_reads_as_empty() {
        let (backend, collections) = store();
        backend.set("psra_incidents", "{not json").unwrap();
        let values: Vec<u32> = collections.read("psra_incidents").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn corrupt_value_aborts_transaction() {
        let (backend, collections) = store();
        backend.set("psra_incidents", "{not json").unwrap();
        let result: Result<(), StoreError> = collections.transact(|tx| {
            let mut values: Vec<u32> = tx.read("psra_incidents")?;
            values.push(1);
            tx.write("psra_incidents", &values)
        });
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
        assert_eq!(backend.get("psra_incidents").unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn reads_see_pending_writes() {
        let (_, collections) = store();
        let seen: Vec<u32> = collections
            .transact::<_, StoreError, _>(|tx| {
                tx.write("psra_incidents", &vec![1_u32, 2])?;
                tx.read("psra_incidents")
            })
            .unwrap();
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn failed_closure_writes_nothing() {
        let (backend, collections) = store();
        let result: Result<(), StoreError> = collections.transact(|tx| {
            tx.write("psra_incidents", &vec![1_u32])?;
            Err(StoreError::InvalidKey("abort".into()))
        });
        assert!(result.is_err());
        assert_eq!(backend.get("psra_incidents").unwrap(), None);
    }

    #[test]
    fn staged_removal_hides_key() {
        let (backend, collections) = store();
        backend.set("psra_incidents", "[]").unwrap();
        backend.set("psra_volunteers", "[]").unwrap();
        collections
            .transact::<_, StoreError, _>(|tx| {
                tx.remove("psra_incidents");
                tx.write("psra_counters", &BTreeMap::from([("incident", 1_u64)]))?;
                assert_eq!(tx.keys()?, vec!["psra_counters", "psra_volunteers"]);
                Ok(())
            })
            .unwrap();
        assert_eq!(backend.keys().unwrap(), vec!["psra_counters", "psra_volunteers"]);
    }
}
