//! Volunteer update builder.

use serde::Serialize;

/// The fields a dispatcher may edit on a registered volunteer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
}

impl VolunteerUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone.is_none() && self.national_id.is_none()
    }
}

#[derive(Debug, Default)]
pub struct VolunteerUpdateBuilder(VolunteerUpdate);

impl VolunteerUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(VolunteerUpdate::default())
    }

    #[must_use]
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.0.full_name = Some(full_name.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.0.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn national_id(mut self, national_id: impl Into<String>) -> Self {
        self.0.national_id = Some(national_id.into());
        self
    }

    #[must_use]
    pub fn build(self) -> VolunteerUpdate {
        self.0
    }
}
