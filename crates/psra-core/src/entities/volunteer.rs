use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::validation::require_text;

/// A registered responder.
///
/// Point totals are not stored here; they are derived from closed incidents.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: String,
    /// `YY * 10000 + sequence`.
    pub member_no: u32,
    pub full_name: String,
    pub national_id: String,
    pub phone: String,
    pub birth_date: String,
    #[serde(default)]
    pub blood_type: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for registering a volunteer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewVolunteer {
    pub full_name: String,
    pub national_id: String,
    pub phone: String,
    pub birth_date: String,
    pub blood_type: String,
    pub region: String,
}

impl NewVolunteer {
    /// All six fields are required.
    ///
    /// # Errors
    ///
    /// `CoreError::Validation` naming the first blank field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("fullName", Some(&self.full_name))?;
        require_text("nationalId", Some(&self.national_id))?;
        require_text("phone", Some(&self.phone))?;
        require_text("birthDate", Some(&self.birth_date))?;
        require_text("bloodType", Some(&self.blood_type))?;
        require_text("region", Some(&self.region))?;
        Ok(())
    }
}
