//! Stored JSON shape tests: camelCase field names, schema validity, and
//! compatibility with records written by older clients.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use schemars::schema_for;
use psra_core::entities::{Incident, SupportRequest, Volunteer};
use psra_core::enums::{IncidentStatus, SupportStatus};

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! stored_shape {
    ($name:ident, $ty:ty, $instance:expr, $expected_keys:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;
            let instance = serde_json::to_value(&val).unwrap();

            let mut keys: Vec<&str> = instance
                .as_object()
                .expect("entities serialize as objects")
                .keys()
                .map(String::as_str)
                .collect();
            keys.sort_unstable();
            let mut expected: Vec<&str> = $expected_keys.to_vec();
            expected.sort_unstable();
            assert_eq!(keys, expected, "stored keys for {}", stringify!($ty));

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

stored_shape!(
    in_progress_incident_shape,
    Incident,
    Incident {
        id: "incident_3_1739000000000_k3j9zq".into(),
        reporter_name: "Abu Mohammed".into(),
        reporter_phone: "0500000001".into(),
        maps_url: "https://www.google.com/maps/place/24.7136,46.6753".into(),
        status: IncidentStatus::InProgress,
        approved_by: Some("supervisor".into()),
        canceled_by: None,
        cancel_reason: None,
        assigned_volunteer_id: Some("vol_7".into()),
        close_note: None,
        closed_at: None,
        incident_type: Some("missing person".into()),
        incident_date: Some(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()),
        incident_image: None,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        updated_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 10, 5, 0).unwrap()),
    },
    [
        "id",
        "reporterName",
        "reporterPhone",
        "mapsUrl",
        "status",
        "approvedBy",
        "assignedVolunteerId",
        "incidentType",
        "incidentDate",
        "createdAt",
        "updatedAt",
    ]
);

stored_shape!(
    volunteer_shape,
    Volunteer,
    Volunteer {
        id: "volunteer_250001_1739000000000_abc123".into(),
        member_no: 250_001,
        full_name: "Noura".into(),
        national_id: "2345678901".into(),
        phone: "0552222222".into(),
        birth_date: "1992-05-10".into(),
        blood_type: "A-".into(),
        region: "Riyadh".into(),
        created_at: None,
    },
    [
        "id",
        "memberNo",
        "fullName",
        "nationalId",
        "phone",
        "birthDate",
        "bloodType",
        "region",
    ]
);

stored_shape!(
    approved_support_request_shape,
    SupportRequest,
    SupportRequest {
        id: "sr1739000000000_q1w2e3".into(),
        incident_id: "incident_3_1739000000000_k3j9zq".into(),
        volunteer_id: "vol_7".into(),
        note: Some("need backup".into()),
        status: SupportStatus::Approved,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap(),
        approved_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 11, 2, 0).unwrap()),
    },
    [
        "id",
        "incidentId",
        "volunteerId",
        "note",
        "status",
        "createdAt",
        "approvedAt",
    ]
);

#[test]
fn support_request_without_status_reads_as_pending() {
    let raw = serde_json::json!({
        "id": "sr1",
        "incidentId": "i1",
        "volunteerId": "v1",
        "createdAt": "2025-03-01T11:00:00Z"
    });
    let request: SupportRequest = serde_json::from_value(raw).unwrap();
    assert_eq!(request.status, SupportStatus::Pending);
    assert_eq!(request.note, None);
}
