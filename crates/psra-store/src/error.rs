//! Store error types.

use thiserror::Error;

/// Errors from store backends and collection transactions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem error.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value is not valid JSON for the requested shape.
    #[error("Corrupt data under '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    /// A value could not be encoded.
    #[error("Failed to encode value for '{key}': {reason}")]
    Encode { key: String, reason: String },

    /// The writer lock stayed busy past the configured timeout.
    #[error("Store is busy: writer lock not acquired within {waited_ms} ms{}", holder_suffix(*.holder))]
    LockTimeout { waited_ms: u64, holder: Option<u32> },

    /// Keys are restricted to `[A-Za-z0-9_-]`.
    #[error("Invalid store key: '{0}'")]
    InvalidKey(String),
}

fn holder_suffix(holder: Option<u32>) -> String {
    holder.map_or_else(String::new, |pid| format!(" (held by pid {pid})"))
}
