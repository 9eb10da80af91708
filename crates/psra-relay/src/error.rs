use psra_core::errors::CoreError;
use psra_store::StoreError;
use thiserror::Error;

use crate::transport::TransportKind;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Notification relay is closed")]
    Closed,

    #[error("No notification transport available: {0}")]
    Unavailable(String),

    #[error("Failed to post notification over {transport}: {reason}")]
    Post {
        transport: TransportKind,
        reason: String,
    },

    /// Inbound message rejected by envelope validation.
    #[error("Malformed notification: {0}")]
    Malformed(String),

    #[error("Failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
