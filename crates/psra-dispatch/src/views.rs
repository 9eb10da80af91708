//! Read models for the dispatcher and volunteer screens.
//!
//! Everything here is computed from lock-free snapshots. Points are never
//! stored: a volunteer's total is `points_per_close` for every closed incident
//! assigned to them, so it always agrees with the incident history.

use std::collections::HashMap;

use psra_core::entities::{Incident, SupportRequest, Volunteer};
use psra_core::enums::{IncidentStatus, SupportStatus};
use serde::Serialize;

use crate::error::DispatchError;
use crate::service::DispatchService;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerStanding {
    #[serde(flatten)]
    pub volunteer: Volunteer,
    pub total_points: u64,
    pub completed_incidents: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatcherSummary {
    pub new: usize,
    pub approved: usize,
    pub in_progress: usize,
    pub closed: usize,
    pub canceled: usize,
    pub total_incidents: usize,
    pub total_volunteers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerSummary {
    /// Approved incidents nobody has accepted yet.
    pub available: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub total_points: u64,
}

/// Closed incidents per assignee.
fn completed_by_volunteer(incidents: &[Incident]) -> HashMap<&str, u64> {
    let mut completed = HashMap::new();
    for incident in incidents {
        if incident.status != IncidentStatus::Closed {
            continue;
        }
        if let Some(volunteer_id) = incident.assigned_volunteer_id.as_deref() {
            *completed.entry(volunteer_id).or_insert(0) += 1;
        }
    }
    completed
}

impl DispatchService {
    fn points_for(&self, completed: u64) -> u64 {
        completed.saturating_mul(u64::from(self.config().points_per_close))
    }

    /// Every volunteer with derived points, highest first.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn volunteer_standings(&self) -> Result<Vec<VolunteerStanding>, DispatchError> {
        let incidents = self.list_incidents()?;
        let completed = completed_by_volunteer(&incidents);

        let mut standings: Vec<VolunteerStanding> = self
            .list_volunteers()?
            .into_iter()
            .map(|volunteer| {
                let completed_incidents = completed.get(volunteer.id.as_str()).copied().unwrap_or(0);
                VolunteerStanding {
                    total_points: self.points_for(completed_incidents),
                    completed_incidents,
                    volunteer,
                }
            })
            .collect();
        standings.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.volunteer.member_no.cmp(&b.volunteer.member_no))
        });
        Ok(standings)
    }

    /// Derived point total for one volunteer id (registered or not).
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn volunteer_points(&self, volunteer_id: &str) -> Result<u64, DispatchError> {
        let incidents = self.list_incidents()?;
        let completed = completed_by_volunteer(&incidents)
            .get(volunteer_id)
            .copied()
            .unwrap_or(0);
        Ok(self.points_for(completed))
    }

    /// What a volunteer's board shows: every approved incident plus the ones
    /// they are working on.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn visible_incidents_for(&self, volunteer_id: &str) -> Result<Vec<Incident>, DispatchError> {
        Ok(self
            .list_incidents()?
            .into_iter()
            .filter(|incident| match incident.status {
                IncidentStatus::Approved => true,
                IncidentStatus::InProgress => incident.is_assigned_to(volunteer_id),
                _ => false,
            })
            .collect())
    }

    /// A volunteer's finished work: closed or canceled incidents they held.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn history_for(&self, volunteer_id: &str) -> Result<Vec<Incident>, DispatchError> {
        Ok(self
            .list_incidents()?
            .into_iter()
            .filter(|incident| incident.status.is_terminal() && incident.is_assigned_to(volunteer_id))
            .collect())
    }

    /// Status of the volunteer's most recent request on an incident.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn support_status_for(
        &self,
        incident_id: &str,
        volunteer_id: &str,
    ) -> Result<Option<SupportStatus>, DispatchError> {
        Ok(self
            .support_requests_for_incident(incident_id)?
            .into_iter()
            .filter(|request| request.volunteer_id == volunteer_id)
            .max_by_key(|request| request.created_at)
            .map(|request: SupportRequest| request.status))
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn dispatcher_summary(&self) -> Result<DispatcherSummary, DispatchError> {
        let incidents = self.list_incidents()?;
        let mut summary = DispatcherSummary {
            total_incidents: incidents.len(),
            total_volunteers: self.list_volunteers()?.len(),
            ..DispatcherSummary::default()
        };
        for incident in &incidents {
            match incident.status {
                IncidentStatus::New => summary.new += 1,
                IncidentStatus::Approved => summary.approved += 1,
                IncidentStatus::InProgress => summary.in_progress += 1,
                IncidentStatus::Closed => summary.closed += 1,
                IncidentStatus::Canceled => summary.canceled += 1,
            }
        }
        Ok(summary)
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn volunteer_summary(&self, volunteer_id: &str) -> Result<VolunteerSummary, DispatchError> {
        let incidents = self.list_incidents()?;
        let mut summary = VolunteerSummary::default();
        for incident in &incidents {
            match incident.status {
                IncidentStatus::Approved if incident.assigned_volunteer_id.is_none() => {
                    summary.available += 1;
                }
                IncidentStatus::InProgress if incident.is_assigned_to(volunteer_id) => {
                    summary.in_progress += 1;
                }
                IncidentStatus::Closed if incident.is_assigned_to(volunteer_id) => {
                    summary.completed += 1;
                }
                _ => {}
            }
        }
        summary.total_points = self.points_for(u64::try_from(summary.completed).unwrap_or(u64::MAX));
        Ok(summary)
    }
}
