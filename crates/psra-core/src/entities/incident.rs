use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::IncidentStatus;
use crate::errors::CoreError;
use crate::validation::{require_text, validate_maps_url};

/// A reported event requiring volunteer response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub reporter_name: String,
    pub reporter_phone: String,
    pub maps_url: String,
    pub status: IncidentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canceled_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Set by the first volunteer to accept; never reassigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_volunteer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_date: Option<DateTime<Utc>>,
    /// Inline image (data URL) attached by the dispatcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_image: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Incident {
    #[must_use]
    pub fn is_assigned_to(&self, volunteer_id: &str) -> bool {
        self.assigned_volunteer_id.as_deref() == Some(volunteer_id)
    }

    /// Assignment matches status: never assigned before acceptance, always
    /// assigned while in progress. Terminal incidents may be either, depending
    /// on whether they went through `in_progress`.
    #[must_use]
    pub const fn assignment_consistent(&self) -> bool {
        match self.status {
            IncidentStatus::New | IncidentStatus::Approved => self.assigned_volunteer_id.is_none(),
            IncidentStatus::InProgress => self.assigned_volunteer_id.is_some(),
            IncidentStatus::Closed | IncidentStatus::Canceled => true,
        }
    }
}

/// Input for creating an incident.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    pub reporter_name: String,
    pub reporter_phone: String,
    pub maps_url: String,
    pub incident_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_image: Option<String>,
}

impl NewIncident {
    /// # Errors
    ///
    /// `CoreError::Validation` naming the first missing or malformed field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("reporterName", Some(&self.reporter_name))?;
        require_text("reporterPhone", Some(&self.reporter_phone))?;
        validate_maps_url(&self.maps_url)?;
        require_text("incidentType", Some(&self.incident_type))?;
        Ok(())
    }
}

/// The incident fields carried in relay notifications.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSummary {
    pub id: String,
    pub reporter_name: String,
    pub reporter_phone: String,
    pub status: IncidentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_volunteer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_url: Option<String>,
}

impl From<&Incident> for IncidentSummary {
    fn from(incident: &Incident) -> Self {
        Self {
            id: incident.id.clone(),
            reporter_name: incident.reporter_name.clone(),
            reporter_phone: incident.reporter_phone.clone(),
            status: incident.status,
            assigned_volunteer_id: incident.assigned_volunteer_id.clone(),
            incident_date: incident.incident_date,
            incident_type: incident.incident_type.clone(),
            maps_url: Some(incident.maps_url.clone()),
        }
    }
}
