//! # psra-dispatch
//!
//! The dispatch core: the incident lifecycle
//! (`new → approved → in_progress → closed`, with `canceled` reachable from
//! any non-terminal state), volunteer support requests, member and incident
//! numbering, and the read models the dispatcher and volunteer screens poll.
//!
//! All operations are methods on [`DispatchService`], grouped by entity in
//! `repos/`. Mutations run as store transactions and, once committed,
//! announce themselves through the optional notification relay.

pub mod error;
pub mod numbering;
pub mod repos;
pub mod service;
pub mod updates;
pub mod views;

#[cfg(test)]
mod test_support;

pub use error::DispatchError;
pub use numbering::{DuplicateNumber, DuplicateReport, NumberingStats};
pub use service::{DispatchService, open_backend};
pub use updates::volunteer::{VolunteerUpdate, VolunteerUpdateBuilder};
pub use views::{DispatcherSummary, VolunteerStanding, VolunteerSummary};
