//! Cross-cutting error types for PSRA.
//!
//! These are the application-level failures a dispatcher or volunteer action
//! can run into. Storage and relay errors live in their own crates and are
//! combined with this one in `psra-dispatch`.

use thiserror::Error;

use crate::enums::{EntityType, IncidentStatus};

/// Errors that can be raised by any PSRA crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced record does not exist.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: EntityType, id: String },

    /// A mandatory field was missing or malformed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Another volunteer already accepted the incident.
    #[error("Incident {id} was already accepted by another volunteer")]
    AlreadyAssigned { id: String },

    /// The incident is not in a state that allows the operation.
    #[error("Incident {id} is not available (status: {status})")]
    InvalidState { id: String, status: IncidentStatus },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    pub fn not_found(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }
}
