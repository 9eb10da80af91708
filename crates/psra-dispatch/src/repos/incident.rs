//! Incident repository: creation, lifecycle transitions, and deletion.

use chrono::Utc;

use psra_core::entities::{Incident, IncidentSummary, NewIncident, SupportRequest};
use psra_core::enums::{EntityType, IncidentStatus};
use psra_core::errors::CoreError;
use psra_core::keys;
use psra_core::validation::require_text;
use psra_relay::Notification;

use crate::error::DispatchError;
use crate::numbering::{bump_counter, incident_id};
use crate::repos::incident_position;
use crate::service::DispatchService;

impl DispatchService {
    /// Record a new report. Status starts at `new`.
    ///
    /// # Errors
    ///
    /// `Validation` for a missing field or unrecognized map link; store failures.
    pub fn create_incident(&self, input: &NewIncident) -> Result<Incident, DispatchError> {
        input.validate()?;
        let now = Utc::now();

        let incident = self.store().transact(|tx| {
            let sequence = bump_counter(tx, keys::INCIDENT_COUNTER)?;
            let incident = Incident {
                id: incident_id(sequence)?,
                reporter_name: input.reporter_name.trim().to_string(),
                reporter_phone: input.reporter_phone.trim().to_string(),
                maps_url: input.maps_url.trim().to_string(),
                status: IncidentStatus::New,
                approved_by: None,
                canceled_by: None,
                cancel_reason: None,
                assigned_volunteer_id: None,
                close_note: None,
                closed_at: None,
                incident_type: Some(input.incident_type.trim().to_string()),
                incident_date: Some(now),
                incident_image: input.incident_image.clone().filter(|img| !img.is_empty()),
                created_at: now,
                updated_at: Some(now),
            };
            let mut incidents: Vec<Incident> = tx.read(keys::INCIDENTS)?;
            incidents.push(incident.clone());
            tx.write(keys::INCIDENTS, &incidents)?;
            Ok::<_, DispatchError>(incident)
        })?;

        tracing::info!(incident_id = %incident.id, "incident created");
        self.notify(&Notification::incidents_updated());
        Ok(incident)
    }

    /// Load incident `id`, let `apply` change it, stamp `updatedAt`, and save.
    fn update_incident<F>(&self, id: &str, apply: F) -> Result<Incident, DispatchError>
    where
        F: FnOnce(&mut Incident) -> Result<(), CoreError>,
    {
        self.store().transact(|tx| {
            let mut incidents: Vec<Incident> = tx.read(keys::INCIDENTS)?;
            let idx = incident_position(&incidents, id)?;
            let incident = &mut incidents[idx];
            apply(incident)?;
            incident.updated_at = Some(Utc::now());
            let updated = incident.clone();
            tx.write(keys::INCIDENTS, &incidents)?;
            Ok(updated)
        })
    }

    /// Mark an incident `approved`. Any prior status is accepted.
    ///
    /// An incident that already has an assignee is put back `in_progress`
    /// with that assignee instead, and is not announced as newly approved.
    /// A blank `approver` records the configured default actor.
    ///
    /// # Errors
    ///
    /// `NotFound` if the incident does not exist; store failures.
    pub fn approve_incident(&self, id: &str, approver: &str) -> Result<Incident, DispatchError> {
        let approver = self.actor_or_default(approver);
        let incident = self.update_incident(id, |incident| {
            incident.status = if incident.assigned_volunteer_id.is_some() {
                IncidentStatus::InProgress
            } else {
                IncidentStatus::Approved
            };
            incident.approved_by = Some(approver);
            Ok(())
        })?;

        if incident.status == IncidentStatus::Approved {
            tracing::info!(incident_id = %incident.id, approved_by = ?incident.approved_by, "incident approved");
            self.notify(&Notification::NewApprovedIncident(IncidentSummary::from(&incident)));
        } else {
            tracing::warn!(
                incident_id = %incident.id,
                volunteer_id = ?incident.assigned_volunteer_id,
                "approval of an assigned incident kept it in progress"
            );
        }
        self.notify(&Notification::incidents_updated());
        Ok(incident)
    }

    /// Mark an incident `canceled`. Any prior status is accepted.
    ///
    /// # Errors
    ///
    /// `Validation` if `reason` is blank; `NotFound`; store failures.
    pub fn cancel_incident(
        &self,
        id: &str,
        canceler: &str,
        reason: &str,
    ) -> Result<Incident, DispatchError> {
        let reason = require_text("cancelReason", Some(reason))?.to_string();
        let canceler = self.actor_or_default(canceler);
        let incident = self.update_incident(id, |incident| {
            incident.status = IncidentStatus::Canceled;
            incident.canceled_by = Some(canceler);
            incident.cancel_reason = Some(reason);
            Ok(())
        })?;

        tracing::info!(incident_id = %incident.id, "incident canceled");
        self.notify(&Notification::incidents_updated());
        Ok(incident)
    }

    /// Assign an approved incident to the first volunteer who accepts it.
    ///
    /// # Errors
    ///
    /// `AlreadyAssigned` once any volunteer holds the incident, `InvalidState`
    /// if it is not `approved`, `NotFound`, `Validation` for a blank volunteer
    /// id; store failures.
    pub fn accept_incident(&self, id: &str, volunteer_id: &str) -> Result<Incident, DispatchError> {
        let volunteer_id = require_text("volunteerId", Some(volunteer_id))?.to_string();
        let incident = self.update_incident(id, |incident| {
            if incident.assigned_volunteer_id.is_some() {
                return Err(CoreError::AlreadyAssigned {
                    id: incident.id.clone(),
                });
            }
            if !incident.status.is_acceptable() {
                return Err(CoreError::InvalidState {
                    id: incident.id.clone(),
                    status: incident.status,
                });
            }
            incident.status = IncidentStatus::InProgress;
            incident.assigned_volunteer_id = Some(volunteer_id);
            Ok(())
        })?;

        tracing::info!(
            incident_id = %incident.id,
            volunteer_id = ?incident.assigned_volunteer_id,
            "incident accepted"
        );
        self.notify(&Notification::incidents_updated());
        Ok(incident)
    }

    /// Mark an incident `closed` with a closing note.
    ///
    /// Points are credited to the assigned volunteer through the derived
    /// standings; `volunteer_id` is the closer and is only logged.
    ///
    /// # Errors
    ///
    /// `Validation` if `note` is blank; `NotFound`; store failures.
    pub fn close_incident(
        &self,
        id: &str,
        volunteer_id: &str,
        note: &str,
    ) -> Result<Incident, DispatchError> {
        let note = require_text("closeNote", Some(note))?.to_string();
        let incident = self.update_incident(id, |incident| {
            incident.status = IncidentStatus::Closed;
            incident.close_note = Some(note);
            incident.closed_at = Some(Utc::now());
            Ok(())
        })?;

        if incident.assigned_volunteer_id.as_deref() != Some(volunteer_id) {
            tracing::warn!(
                incident_id = %incident.id,
                closed_by = volunteer_id,
                assigned = ?incident.assigned_volunteer_id,
                "incident closed by someone other than its assignee"
            );
        }
        tracing::info!(incident_id = %incident.id, "incident closed");
        self.notify(&Notification::incidents_updated());
        Ok(incident)
    }

    /// Delete an incident together with its support requests.
    ///
    /// # Errors
    ///
    /// `NotFound`; store failures.
    pub fn delete_incident(&self, id: &str) -> Result<Incident, DispatchError> {
        let (removed, cascaded) = self.store().transact(|tx| {
            let mut incidents: Vec<Incident> = tx.read(keys::INCIDENTS)?;
            let idx = incident_position(&incidents, id)?;
            let removed = incidents.remove(idx);

            let mut requests: Vec<SupportRequest> = tx.read(keys::SUPPORT_REQUESTS)?;
            let before = requests.len();
            requests.retain(|request| request.incident_id != id);
            let cascaded = before - requests.len();

            tx.write(keys::INCIDENTS, &incidents)?;
            if cascaded > 0 {
                tx.write(keys::SUPPORT_REQUESTS, &requests)?;
            }
            Ok::<_, DispatchError>((removed, cascaded))
        })?;

        tracing::info!(incident_id = id, support_requests = cascaded, "incident deleted");
        self.notify(&Notification::incidents_updated());
        Ok(removed)
    }

    /// # Errors
    ///
    /// `NotFound`; store failures.
    pub fn get_incident(&self, id: &str) -> Result<Incident, DispatchError> {
        self.list_incidents()?
            .into_iter()
            .find(|incident| incident.id == id)
            .ok_or_else(|| CoreError::not_found(EntityType::Incident, id).into())
    }

    /// All incidents in stored order.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn list_incidents(&self) -> Result<Vec<Incident>, DispatchError> {
        Ok(self.store().read(keys::INCIDENTS)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use psra_core::enums::IncidentStatus;
    use psra_core::errors::CoreError;
    use rstest::rstest;

    use crate::error::DispatchError;
    use crate::test_support::helpers::{approved_incident, new_incident, test_service};

    #[test]
    fn create_starts_new_and_numbered() {
        let svc = test_service();
        let incident = svc.create_incident(&new_incident()).unwrap();
        assert_eq!(incident.status, IncidentStatus::New);
        assert!(incident.id.starts_with("incident_1_"));
        assert!(incident.incident_date.is_some());
        assert_eq!(svc.list_incidents().unwrap().len(), 1);
    }

    #[test]
    fn create_rejects_bad_maps_link() {
        let svc = test_service();
        let mut input = new_incident();
        input.maps_url = "https://example.com/somewhere".into();
        let err = svc.create_incident(&input).unwrap_err();
        assert!(matches!(err, DispatchError::Core(CoreError::Validation(_))));
        assert!(svc.list_incidents().unwrap().is_empty());
    }

    #[test]
    fn approve_records_approver_and_defaults_blank() {
        let svc = test_service();
        let incident = svc.create_incident(&new_incident()).unwrap();
        let approved = svc.approve_incident(&incident.id, "  ").unwrap();
        assert_eq!(approved.status, IncidentStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("supervisor"));
        assert!(approved.updated_at >= incident.updated_at);
    }

    #[test]
    fn approve_is_permissive_about_prior_status() {
        let svc = test_service();
        let incident = approved_incident(&svc);
        svc.cancel_incident(&incident.id, "supervisor", "duplicate").unwrap();
        let again = svc.approve_incident(&incident.id, "lead").unwrap();
        assert_eq!(again.status, IncidentStatus::Approved);
        assert_eq!(again.approved_by.as_deref(), Some("lead"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn cancel_requires_reason(#[case] reason: &str) {
        let svc = test_service();
        let incident = svc.create_incident(&new_incident()).unwrap();
        let err = svc.cancel_incident(&incident.id, "supervisor", reason).unwrap_err();
        assert!(matches!(err, DispatchError::Core(CoreError::Validation(_))));
        assert_eq!(svc.get_incident(&incident.id).unwrap().status, IncidentStatus::New);
    }

    #[test]
    fn cancel_records_canceler_and_reason() {
        let svc = test_service();
        let incident = svc.create_incident(&new_incident()).unwrap();
        let canceled = svc
            .cancel_incident(&incident.id, "supervisor", "false report")
            .unwrap();
        assert_eq!(canceled.status, IncidentStatus::Canceled);
        assert_eq!(canceled.canceled_by.as_deref(), Some("supervisor"));
        assert_eq!(canceled.cancel_reason.as_deref(), Some("false report"));
    }

    #[test]
    fn accept_requires_approved_status() {
        let svc = test_service();
        let incident = svc.create_incident(&new_incident()).unwrap();
        let err = svc.accept_incident(&incident.id, "vol_7").unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Core(CoreError::InvalidState {
                status: IncidentStatus::New,
                ..
            })
        ));
    }

    #[test]
    fn accept_conflict_is_reported_before_status() {
        let svc = test_service();
        let incident = approved_incident(&svc);
        svc.accept_incident(&incident.id, "vol_7").unwrap();
        svc.close_incident(&incident.id, "vol_7", "done").unwrap();

        let err = svc.accept_incident(&incident.id, "vol_9").unwrap_err();
        assert!(matches!(err, DispatchError::Core(CoreError::AlreadyAssigned { .. })));
    }

    #[test]
    fn reapproving_keeps_the_assignee_in_progress() {
        let svc = test_service();
        let incident = approved_incident(&svc);
        svc.accept_incident(&incident.id, "vol_7").unwrap();
        let again = svc.approve_incident(&incident.id, "supervisor").unwrap();
        assert_eq!(again.status, IncidentStatus::InProgress);
        assert_eq!(again.assigned_volunteer_id.as_deref(), Some("vol_7"));
        assert!(again.assignment_consistent());
        let err = svc.accept_incident(&incident.id, "vol_9").unwrap_err();
        assert!(matches!(err, DispatchError::Core(CoreError::AlreadyAssigned { .. })));
    }

    #[test]
    fn approving_a_canceled_assigned_incident_reopens_it() {
        let svc = test_service();
        let incident = approved_incident(&svc);
        svc.accept_incident(&incident.id, "vol_7").unwrap();
        svc.cancel_incident(&incident.id, "supervisor", "duplicate report")
            .unwrap();
        let reopened = svc.approve_incident(&incident.id, "supervisor").unwrap();
        assert_eq!(reopened.status, IncidentStatus::InProgress);
        assert_eq!(reopened.assigned_volunteer_id.as_deref(), Some("vol_7"));
        assert!(reopened.assignment_consistent());
    }

    #[test]
    fn transitions_on_missing_incident_are_not_found() {
        let svc = test_service();
        for result in [
            svc.approve_incident("nope", "supervisor"),
            svc.cancel_incident("nope", "supervisor", "reason"),
            svc.accept_incident("nope", "vol_7"),
            svc.close_incident("nope", "vol_7", "note"),
            svc.delete_incident("nope"),
        ] {
            assert!(matches!(
                result,
                Err(DispatchError::Core(CoreError::NotFound { .. }))
            ));
        }
    }

    #[test]
    fn close_stamps_note_and_time() {
        let svc = test_service();
        let incident = approved_incident(&svc);
        svc.accept_incident(&incident.id, "vol_7").unwrap();
        let closed = svc.close_incident(&incident.id, "vol_7", " all safe ").unwrap();
        assert_eq!(closed.status, IncidentStatus::Closed);
        assert_eq!(closed.close_note.as_deref(), Some("all safe"));
        assert!(closed.closed_at.is_some());
        assert!(closed.assignment_consistent());
    }
}
