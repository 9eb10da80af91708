//! Notification types, payloads, and the wire envelope.
//!
//! On the wire every notification is a JSON object
//! `{ "type", "data", "senderId", "timestamp" }` with `type` in
//! SCREAMING_SNAKE_CASE and `timestamp` in epoch milliseconds.

use chrono::Utc;
use psra_core::entities::{IncidentSummary, SupportRequest};
use psra_core::errors::CoreError;
use psra_core::ids::{format_sender_id, random_base36};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RelayError;

/// Length of the random part of a sender id.
const SENDER_SUFFIX_LEN: usize = 9;

pub const SUPPORT_APPROVED_MESSAGE: &str = "Support request approved; backup is on the way";
pub const SUPPORT_DELETED_MESSAGE: &str = "Support request deleted";

// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    NewApprovedIncident,
    IncidentsUpdated,
    NewSupportRequest,
    SupportApproved,
    SupportDeleted,
}

impl NotificationType {
    pub const ALL: [Self; 5] = [
        Self::NewApprovedIncident,
        Self::IncidentsUpdated,
        Self::NewSupportRequest,
        Self::SupportApproved,
        Self::SupportDeleted,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewApprovedIncident => "NEW_APPROVED_INCIDENT",
            Self::IncidentsUpdated => "INCIDENTS_UPDATED",
            Self::NewSupportRequest => "NEW_SUPPORT_REQUEST",
            Self::SupportApproved => "SUPPORT_APPROVED",
            Self::SupportDeleted => "SUPPORT_DELETED",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentsUpdated {
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportApproved {
    pub support_request: SupportRequest,
    pub volunteer_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportDeleted {
    pub volunteer_id: String,
    pub message: String,
}

/// A decoded notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    NewApprovedIncident(IncidentSummary),
    IncidentsUpdated(IncidentsUpdated),
    NewSupportRequest(SupportRequest),
    SupportApproved(SupportApproved),
    SupportDeleted(SupportDeleted),
}

impl Notification {
    #[must_use]
    pub fn incidents_updated() -> Self {
        Self::IncidentsUpdated(IncidentsUpdated {
            timestamp: Utc::now().timestamp_millis(),
        })
    }

    #[must_use]
    pub fn support_approved(request: SupportRequest) -> Self {
        Self::SupportApproved(SupportApproved {
            volunteer_id: request.volunteer_id.clone(),
            support_request: request,
            message: SUPPORT_APPROVED_MESSAGE.to_string(),
        })
    }

    #[must_use]
    pub fn support_deleted(volunteer_id: impl Into<String>) -> Self {
        Self::SupportDeleted(SupportDeleted {
            volunteer_id: volunteer_id.into(),
            message: SUPPORT_DELETED_MESSAGE.to_string(),
        })
    }

    #[must_use]
    pub const fn kind(&self) -> NotificationType {
        match self {
            Self::NewApprovedIncident(_) => NotificationType::NewApprovedIncident,
            Self::IncidentsUpdated(_) => NotificationType::IncidentsUpdated,
            Self::NewSupportRequest(_) => NotificationType::NewSupportRequest,
            Self::SupportApproved(_) => NotificationType::SupportApproved,
            Self::SupportDeleted(_) => NotificationType::SupportDeleted,
        }
    }

    /// The volunteer a notification is meant for, when it is personal.
    #[must_use]
    pub fn addressed_to(&self) -> Option<&str> {
        match self {
            Self::SupportApproved(payload) => Some(&payload.volunteer_id),
            Self::SupportDeleted(payload) => Some(&payload.volunteer_id),
            _ => None,
        }
    }

    fn to_data(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::NewApprovedIncident(payload) => serde_json::to_value(payload),
            Self::IncidentsUpdated(payload) => serde_json::to_value(payload),
            Self::NewSupportRequest(payload) => serde_json::to_value(payload),
            Self::SupportApproved(payload) => serde_json::to_value(payload),
            Self::SupportDeleted(payload) => serde_json::to_value(payload),
        }
    }

    fn from_data(kind: NotificationType, data: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            NotificationType::NewApprovedIncident => {
                Self::NewApprovedIncident(serde_json::from_value(data)?)
            }
            NotificationType::IncidentsUpdated => {
                Self::IncidentsUpdated(serde_json::from_value(data)?)
            }
            NotificationType::NewSupportRequest => {
                Self::NewSupportRequest(serde_json::from_value(data)?)
            }
            NotificationType::SupportApproved => Self::SupportApproved(serde_json::from_value(data)?),
            NotificationType::SupportDeleted => Self::SupportDeleted(serde_json::from_value(data)?),
        })
    }
}

// ---------------------------------------------------------------------------
// SenderId
// ---------------------------------------------------------------------------

/// Identity of one relay instance, stamped on everything it sends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SenderId(String);

impl SenderId {
    /// `sender_{epochMs}_{rand9}`
    ///
    /// # Errors
    ///
    /// `CoreError::Other` if the OS random source is unavailable.
    pub fn generate() -> Result<Self, CoreError> {
        let suffix = random_base36(SENDER_SUFFIX_LEN)?;
        Ok(Self(format_sender_id(Utc::now().timestamp_millis(), &suffix)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SenderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SenderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for SenderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub notification: Notification,
    pub sender_id: SenderId,
    pub timestamp: i64,
}

impl Envelope {
    #[must_use]
    pub fn new(notification: Notification, sender_id: SenderId) -> Self {
        Self {
            notification,
            sender_id,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// # Errors
    ///
    /// `RelayError::Encode` if the payload does not serialize.
    pub fn to_wire(&self) -> Result<Value, RelayError> {
        let mut wire = Map::new();
        wire.insert("type".into(), Value::from(self.notification.kind().as_str()));
        wire.insert("data".into(), self.notification.to_data()?);
        wire.insert("senderId".into(), Value::from(self.sender_id.as_str()));
        wire.insert("timestamp".into(), Value::from(self.timestamp));
        Ok(Value::Object(wire))
    }

    /// Validate and decode an inbound message.
    ///
    /// # Errors
    ///
    /// `RelayError::Malformed` describing the first check that failed.
    pub fn from_wire(raw: &Value) -> Result<Self, RelayError> {
        let malformed = |reason: &str| RelayError::Malformed(reason.to_string());

        let object = raw.as_object().ok_or_else(|| malformed("not an object"))?;
        for field in ["type", "data", "senderId", "timestamp"] {
            if !object.get(field).is_some_and(is_truthy) {
                return Err(RelayError::Malformed(format!("missing {field}")));
            }
        }

        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .and_then(NotificationType::parse)
            .ok_or_else(|| malformed("unknown type"))?;
        let sender_id = object
            .get("senderId")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("senderId is not a string"))?;
        let timestamp = object
            .get("timestamp")
            .and_then(Value::as_f64)
            .ok_or_else(|| malformed("timestamp is not a number"))?;
        let data = object.get("data").cloned().unwrap_or(Value::Null);
        let notification = Notification::from_data(kind, data)
            .map_err(|err| RelayError::Malformed(format!("{kind} payload: {err}")))?;

        #[allow(clippy::cast_possible_truncation)]
        Ok(Self {
            notification,
            sender_id: SenderId::from(sender_id),
            timestamp: timestamp as i64,
        })
    }
}

/// JavaScript-style truthiness, as senders in other sessions check it.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use psra_core::enums::SupportStatus;
    use rstest::rstest;
    use serde_json::json;

    fn request() -> SupportRequest {
        SupportRequest {
            id: "sr1739000000000_q1w2e3".into(),
            incident_id: "incident_1_1739000000000_abc123".into(),
            volunteer_id: "vol_7".into(),
            note: None,
            status: SupportStatus::Approved,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap(),
            approved_at: None,
        }
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let envelope = Envelope {
            notification: Notification::support_approved(request()),
            sender_id: SenderId::from("sender_1_abc"),
            timestamp: 1_739_000_000_000,
        };
        let wire = envelope.to_wire().unwrap();
        assert_eq!(wire["type"], "SUPPORT_APPROVED");
        assert_eq!(wire["senderId"], "sender_1_abc");
        assert_eq!(wire["data"]["volunteerId"], "vol_7");
        assert_eq!(wire["data"]["supportRequest"]["incidentId"], "incident_1_1739000000000_abc123");

        let back = Envelope::from_wire(&wire).unwrap();
        assert_eq!(back, envelope);
    }

    #[rstest]
    #[case::not_object(json!("hello"))]
    #[case::missing_sender(json!({"type": "INCIDENTS_UPDATED", "data": {"timestamp": 1}, "timestamp": 1}))]
    #[case::empty_sender(json!({"type": "INCIDENTS_UPDATED", "data": {"timestamp": 1}, "senderId": "", "timestamp": 1}))]
    #[case::zero_timestamp(json!({"type": "INCIDENTS_UPDATED", "data": {"timestamp": 1}, "senderId": "s", "timestamp": 0}))]
    #[case::unknown_type(json!({"type": "PING", "data": {}, "senderId": "s", "timestamp": 1}))]
    #[case::numeric_sender(json!({"type": "INCIDENTS_UPDATED", "data": {"timestamp": 1}, "senderId": 7, "timestamp": 1}))]
    #[case::string_timestamp(json!({"type": "INCIDENTS_UPDATED", "data": {"timestamp": 1}, "senderId": "s", "timestamp": "1"}))]
    #[case::payload_mismatch(json!({"type": "SUPPORT_DELETED", "data": {"timestamp": 1}, "senderId": "s", "timestamp": 1}))]
    fn rejects_malformed(#[case] raw: Value) {
        assert!(matches!(Envelope::from_wire(&raw), Err(RelayError::Malformed(_))));
    }

    #[test]
    fn addressed_to_only_personal_notifications() {
        assert_eq!(Notification::support_deleted("vol_3").addressed_to(), Some("vol_3"));
        assert_eq!(Notification::support_approved(request()).addressed_to(), Some("vol_7"));
        assert_eq!(Notification::incidents_updated().addressed_to(), None);
    }

    #[test]
    fn generated_sender_ids_differ() {
        let a = SenderId::generate().unwrap();
        let b = SenderId::generate().unwrap();
        assert!(a.as_str().starts_with("sender_"));
        assert_ne!(a, b);
    }

    #[test]
    fn type_names_round_trip() {
        for kind in NotificationType::ALL {
            assert_eq!(NotificationType::parse(kind.as_str()), Some(kind));
        }
    }
}
