//! Dispatch error types.

use psra_core::errors::CoreError;
use psra_store::StoreError;
use thiserror::Error;

/// Errors from dispatch operations.
///
/// Relay failures never appear here: a mutation that committed stays
/// committed even if its notification could not be sent.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DispatchError {
    /// The domain error, if this is one.
    #[must_use]
    pub const fn as_core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(err) => Some(err),
            Self::Store(_) => None,
        }
    }
}
