//! Repository modules implementing the operations for each PSRA entity.
//!
//! Each module adds methods to `DispatchService` via `impl DispatchService` blocks.

pub mod incident;
pub mod maintenance;
pub mod support;
pub mod volunteer;

use psra_core::entities::{Incident, SupportRequest, Volunteer};
use psra_core::enums::EntityType;
use psra_core::errors::CoreError;

/// Position of the record with `id`, or `NotFound`.
pub(crate) fn position_of<T>(
    records: &[T],
    id: &str,
    entity_type: EntityType,
    id_of: impl Fn(&T) -> &str,
) -> Result<usize, CoreError> {
    records
        .iter()
        .position(|record| id_of(record) == id)
        .ok_or_else(|| CoreError::not_found(entity_type, id))
}

pub(crate) fn incident_position(incidents: &[Incident], id: &str) -> Result<usize, CoreError> {
    position_of(incidents, id, EntityType::Incident, |i| &i.id)
}

pub(crate) fn volunteer_position(volunteers: &[Volunteer], id: &str) -> Result<usize, CoreError> {
    position_of(volunteers, id, EntityType::Volunteer, |v| &v.id)
}

pub(crate) fn support_position(requests: &[SupportRequest], id: &str) -> Result<usize, CoreError> {
    position_of(requests, id, EntityType::SupportRequest, |r| &r.id)
}
