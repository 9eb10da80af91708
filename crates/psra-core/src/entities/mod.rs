//! Entity structs for all PSRA records.
//!
//! Each entity is one element of a JSON array kept under a fixed store key
//! (see [`crate::keys`]). Field names are camelCase on the wire; optional
//! fields default when absent so older records keep loading.

mod incident;
mod support;
mod volunteer;

use std::collections::BTreeMap;

pub use incident::{Incident, IncidentSummary, NewIncident};
pub use support::SupportRequest;
pub use volunteer::{NewVolunteer, Volunteer};

/// Counter name → last issued value.
pub type Counters = BTreeMap<String, u64>;
