//! Support request repository.

use chrono::Utc;

use psra_core::entities::{Incident, SupportRequest};
use psra_core::enums::{EntityType, SupportStatus};
use psra_core::errors::CoreError;
use psra_core::ids::{ENTITY_SUFFIX_LEN, format_support_id, random_base36};
use psra_core::keys;
use psra_core::validation::require_text;
use psra_relay::Notification;

use crate::error::DispatchError;
use crate::repos::{incident_position, support_position};
use crate::service::DispatchService;

impl DispatchService {
    /// File a `pending` request for backup on an incident.
    ///
    /// The incident may be in any status. A blank note is stored as absent.
    ///
    /// # Errors
    ///
    /// `NotFound` if the incident does not exist, `Validation` for a blank
    /// volunteer id; store failures.
    pub fn request_support(
        &self,
        incident_id: &str,
        volunteer_id: &str,
        note: Option<&str>,
    ) -> Result<SupportRequest, DispatchError> {
        let volunteer_id = require_text("volunteerId", Some(volunteer_id))?.to_string();
        let note = note.map(str::trim).filter(|n| !n.is_empty()).map(String::from);
        let now = Utc::now();
        let id = format_support_id(now.timestamp_millis(), &random_base36(ENTITY_SUFFIX_LEN)?);

        let request = self.store().transact(|tx| {
            let incidents: Vec<Incident> = tx.read(keys::INCIDENTS)?;
            incident_position(&incidents, incident_id)?;

            let request = SupportRequest {
                id,
                incident_id: incident_id.to_string(),
                volunteer_id,
                note,
                status: SupportStatus::Pending,
                created_at: now,
                approved_at: None,
            };
            let mut requests: Vec<SupportRequest> = tx.read(keys::SUPPORT_REQUESTS)?;
            requests.push(request.clone());
            tx.write(keys::SUPPORT_REQUESTS, &requests)?;
            Ok::<_, DispatchError>(request)
        })?;

        tracing::info!(
            support_request_id = %request.id,
            incident_id,
            volunteer_id = %request.volunteer_id,
            "support requested"
        );
        self.notify(&Notification::NewSupportRequest(request.clone()));
        Ok(request)
    }

    /// Approve a request and tell the volunteer who filed it.
    ///
    /// # Errors
    ///
    /// `NotFound`; store failures.
    pub fn approve_support(&self, request_id: &str) -> Result<SupportRequest, DispatchError> {
        let request = self.store().transact(|tx| {
            let mut requests: Vec<SupportRequest> = tx.read(keys::SUPPORT_REQUESTS)?;
            let idx = support_position(&requests, request_id)?;
            let request = &mut requests[idx];
            request.status = SupportStatus::Approved;
            request.approved_at = Some(Utc::now());
            let approved = request.clone();
            tx.write(keys::SUPPORT_REQUESTS, &requests)?;
            Ok::<_, DispatchError>(approved)
        })?;

        tracing::info!(
            support_request_id = request_id,
            volunteer_id = %request.volunteer_id,
            "support approved"
        );
        self.notify(&Notification::support_approved(request.clone()));
        Ok(request)
    }

    /// Delete a request and tell the volunteer who filed it.
    ///
    /// # Errors
    ///
    /// `NotFound`; store failures.
    pub fn delete_support(&self, request_id: &str) -> Result<SupportRequest, DispatchError> {
        let removed = self.store().transact(|tx| {
            let mut requests: Vec<SupportRequest> = tx.read(keys::SUPPORT_REQUESTS)?;
            let idx = support_position(&requests, request_id)?;
            let removed = requests.remove(idx);
            tx.write(keys::SUPPORT_REQUESTS, &requests)?;
            Ok::<_, DispatchError>(removed)
        })?;

        tracing::info!(
            support_request_id = request_id,
            volunteer_id = %removed.volunteer_id,
            "support request deleted"
        );
        self.notify(&Notification::support_deleted(removed.volunteer_id.clone()));
        Ok(removed)
    }

    /// # Errors
    ///
    /// `NotFound`; store failures.
    pub fn get_support_request(&self, request_id: &str) -> Result<SupportRequest, DispatchError> {
        self.list_support_requests()?
            .into_iter()
            .find(|request| request.id == request_id)
            .ok_or_else(|| CoreError::not_found(EntityType::SupportRequest, request_id).into())
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn list_support_requests(&self) -> Result<Vec<SupportRequest>, DispatchError> {
        Ok(self.store().read(keys::SUPPORT_REQUESTS)?)
    }

    /// Requests filed against one incident, oldest first.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn support_requests_for_incident(
        &self,
        incident_id: &str,
    ) -> Result<Vec<SupportRequest>, DispatchError> {
        let mut requests: Vec<SupportRequest> = self
            .list_support_requests()?
            .into_iter()
            .filter(|request| request.incident_id == incident_id)
            .collect();
        requests.sort_by_key(|request| request.created_at);
        Ok(requests)
    }
}
