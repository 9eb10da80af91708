//! Whole-store maintenance.

use psra_core::keys;

use crate::error::DispatchError;
use crate::service::DispatchService;

impl DispatchService {
    /// Remove every application key except the preserved session keys.
    /// Returns the removed keys, sorted.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn clear_all_data(&self) -> Result<Vec<String>, DispatchError> {
        let removed = self.store().transact(|tx| {
            let removed: Vec<String> = tx
                .keys()?
                .into_iter()
                .filter(|key| keys::is_clearable(key))
                .collect();
            for key in &removed {
                tx.remove(key);
            }
            Ok::<_, DispatchError>(removed)
        })?;

        tracing::info!(keys = removed.len(), "cleared application data");
        Ok(removed)
    }
}
