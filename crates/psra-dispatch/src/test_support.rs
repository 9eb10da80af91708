//! Shared test utilities for psra-dispatch unit tests.

pub(crate) mod helpers {
    use std::sync::Arc;

    use psra_config::DispatchConfig;
    use psra_core::entities::{Incident, NewIncident, NewVolunteer, Volunteer};
    use psra_store::{CollectionStore, MemoryStore};
    use serde::Serialize;

    use crate::service::DispatchService;

    /// In-memory service without a relay.
    pub fn test_service() -> DispatchService {
        DispatchService::new(
            CollectionStore::new(Arc::new(MemoryStore::new())),
            DispatchConfig::default(),
        )
    }

    /// Write `value` straight to the backend, bypassing the service.
    pub fn seed<T: Serialize + ?Sized>(svc: &DispatchService, key: &str, value: &T) {
        let raw = serde_json::to_string(value).unwrap();
        svc.store().backend().set(key, &raw).unwrap();
    }

    pub fn new_incident() -> NewIncident {
        NewIncident {
            reporter_name: "Abu Mohammed".into(),
            reporter_phone: "0500000001".into(),
            maps_url: "https://www.google.com/maps/place/24.7136,46.6753".into(),
            incident_type: "missing person".into(),
            incident_image: None,
        }
    }

    pub fn new_volunteer(name: &str) -> NewVolunteer {
        NewVolunteer {
            full_name: name.into(),
            national_id: "1234567890".into(),
            phone: "0551111111".into(),
            birth_date: "1990-01-01".into(),
            blood_type: "O+".into(),
            region: "Riyadh".into(),
        }
    }

    /// Create and approve an incident.
    pub fn approved_incident(svc: &DispatchService) -> Incident {
        let incident = svc.create_incident(&new_incident()).unwrap();
        svc.approve_incident(&incident.id, "supervisor").unwrap()
    }

    /// Create, approve, and accept an incident for `volunteer`.
    pub fn accepted_incident(svc: &DispatchService, volunteer: &Volunteer) -> Incident {
        let incident = approved_incident(svc);
        svc.accept_incident(&incident.id, &volunteer.id).unwrap()
    }

    pub fn raw_keys(svc: &DispatchService) -> Vec<String> {
        svc.store().backend().keys().unwrap()
    }
}
