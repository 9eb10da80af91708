//! Volunteer repository.

use chrono::Utc;

use psra_core::entities::{NewVolunteer, Volunteer};
use psra_core::enums::EntityType;
use psra_core::errors::CoreError;
use psra_core::keys;
use psra_core::member_number;
use psra_core::validation::require_text;

use crate::error::DispatchError;
use crate::numbering::{allocate_member_number, volunteer_id};
use crate::repos::volunteer_position;
use crate::service::DispatchService;
use crate::updates::volunteer::VolunteerUpdate;

impl DispatchService {
    /// Register a volunteer under the next free member number of the year.
    ///
    /// # Errors
    ///
    /// `Validation` naming the first blank field; store failures.
    pub fn register_volunteer(&self, input: &NewVolunteer) -> Result<Volunteer, DispatchError> {
        input.validate()?;
        let now = Utc::now();
        let year_prefix = member_number::year_prefix(&now);

        let volunteer = self.store().transact(|tx| {
            let member_no = allocate_member_number(tx, year_prefix)?;
            let volunteer = Volunteer {
                id: volunteer_id(member_no)?,
                member_no,
                full_name: input.full_name.trim().to_string(),
                national_id: input.national_id.trim().to_string(),
                phone: input.phone.trim().to_string(),
                birth_date: input.birth_date.trim().to_string(),
                blood_type: input.blood_type.trim().to_string(),
                region: input.region.trim().to_string(),
                created_at: Some(now),
            };
            let mut volunteers: Vec<Volunteer> = tx.read(keys::VOLUNTEERS)?;
            volunteers.push(volunteer.clone());
            tx.write(keys::VOLUNTEERS, &volunteers)?;
            Ok::<_, DispatchError>(volunteer)
        })?;

        tracing::info!(
            volunteer_id = %volunteer.id,
            member_no = volunteer.member_no,
            "volunteer registered"
        );
        Ok(volunteer)
    }

    /// Apply the `Some` fields of `update`. An empty update returns the
    /// stored volunteer unchanged.
    ///
    /// # Errors
    ///
    /// `NotFound`; `Validation` if a provided field is blank; store failures.
    pub fn update_volunteer(
        &self,
        id: &str,
        update: &VolunteerUpdate,
    ) -> Result<Volunteer, DispatchError> {
        if update.is_empty() {
            return self.get_volunteer(id);
        }
        let full_name = update
            .full_name
            .as_deref()
            .map(|v| require_text("fullName", Some(v)).map(String::from))
            .transpose()?;
        let phone = update
            .phone
            .as_deref()
            .map(|v| require_text("phone", Some(v)).map(String::from))
            .transpose()?;
        let national_id = update
            .national_id
            .as_deref()
            .map(|v| require_text("nationalId", Some(v)).map(String::from))
            .transpose()?;

        let volunteer = self.store().transact(|tx| {
            let mut volunteers: Vec<Volunteer> = tx.read(keys::VOLUNTEERS)?;
            let idx = volunteer_position(&volunteers, id)?;
            let volunteer = &mut volunteers[idx];
            if let Some(full_name) = full_name {
                volunteer.full_name = full_name;
            }
            if let Some(phone) = phone {
                volunteer.phone = phone;
            }
            if let Some(national_id) = national_id {
                volunteer.national_id = national_id;
            }
            let updated = volunteer.clone();
            tx.write(keys::VOLUNTEERS, &volunteers)?;
            Ok::<_, DispatchError>(updated)
        })?;

        tracing::info!(volunteer_id = id, changed = ?update, "volunteer updated");
        Ok(volunteer)
    }

    /// Remove a volunteer. Incidents assigned to them keep the id.
    ///
    /// # Errors
    ///
    /// `NotFound`; store failures.
    pub fn delete_volunteer(&self, id: &str) -> Result<Volunteer, DispatchError> {
        let removed = self.store().transact(|tx| {
            let mut volunteers: Vec<Volunteer> = tx.read(keys::VOLUNTEERS)?;
            let idx = volunteer_position(&volunteers, id)?;
            let removed = volunteers.remove(idx);
            tx.write(keys::VOLUNTEERS, &volunteers)?;
            Ok::<_, DispatchError>(removed)
        })?;

        tracing::info!(volunteer_id = id, "volunteer deleted");
        Ok(removed)
    }

    /// # Errors
    ///
    /// `NotFound`; store failures.
    pub fn get_volunteer(&self, id: &str) -> Result<Volunteer, DispatchError> {
        self.list_volunteers()?
            .into_iter()
            .find(|volunteer| volunteer.id == id)
            .ok_or_else(|| CoreError::not_found(EntityType::Volunteer, id).into())
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn list_volunteers(&self) -> Result<Vec<Volunteer>, DispatchError> {
        Ok(self.store().read(keys::VOLUNTEERS)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use psra_core::errors::CoreError;
    use psra_core::member_number;

    use crate::error::DispatchError;
    use crate::test_support::helpers::{new_volunteer, test_service};
    use crate::updates::volunteer::VolunteerUpdateBuilder;

    #[test]
    fn registration_embeds_member_number_in_id() {
        let svc = test_service();
        let first = svc.register_volunteer(&new_volunteer("Saud")).unwrap();
        let second = svc.register_volunteer(&new_volunteer("Noura")).unwrap();

        assert!(member_number::is_valid(first.member_no));
        assert_eq!(second.member_no, first.member_no + 1);
        assert!(first.id.starts_with(&format!("volunteer_{}_", first.member_no)));
        assert_eq!(
            psra_core::ids::extract_member_number(&second.id),
            Some(second.member_no)
        );
    }

    #[test]
    fn registration_requires_every_field() {
        let svc = test_service();
        let mut input = new_volunteer("Saud");
        input.blood_type = " ".into();
        let err = svc.register_volunteer(&input).unwrap_err();
        assert!(matches!(err, DispatchError::Core(CoreError::Validation(msg)) if msg.contains("bloodType")));
        assert!(svc.list_volunteers().unwrap().is_empty());
    }

    #[test]
    fn update_changes_only_given_fields() {
        let svc = test_service();
        let volunteer = svc.register_volunteer(&new_volunteer("Saud")).unwrap();
        let update = VolunteerUpdateBuilder::new().phone("0559999999").build();

        let updated = svc.update_volunteer(&volunteer.id, &update).unwrap();
        assert_eq!(updated.phone, "0559999999");
        assert_eq!(updated.full_name, "Saud");
        assert_eq!(svc.get_volunteer(&volunteer.id).unwrap(), updated);
    }

    #[test]
    fn update_rejects_blank_values() {
        let svc = test_service();
        let volunteer = svc.register_volunteer(&new_volunteer("Saud")).unwrap();
        let update = VolunteerUpdateBuilder::new().full_name("").build();
        assert!(svc.update_volunteer(&volunteer.id, &update).is_err());
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let svc = test_service();
        let volunteer = svc.register_volunteer(&new_volunteer("Saud")).unwrap();
        svc.delete_volunteer(&volunteer.id).unwrap();
        assert!(matches!(
            svc.get_volunteer(&volunteer.id),
            Err(DispatchError::Core(CoreError::NotFound { .. }))
        ));
    }
}
