//! Status enums and entity types for PSRA dispatch.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`,
//! which is also the representation kept in the store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// IncidentStatus
// ---------------------------------------------------------------------------

/// Status of an incident through its dispatch lifecycle.
///
/// ```text
/// new → approved → in_progress → closed
///  └───────┴────────────┴──────→ canceled
/// ```
///
/// Only `accept` guards its source state. Approve and cancel are accepted from
/// any state, including terminal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    New,
    Approved,
    InProgress,
    Closed,
    Canceled,
}

impl IncidentStatus {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Approved,
        Self::InProgress,
        Self::Closed,
        Self::Canceled,
    ];

    /// `closed` and `canceled` end the lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Canceled)
    }

    /// Whether a volunteer may accept an incident in this state.
    #[must_use]
    pub const fn is_acceptable(self) -> bool {
        matches!(self, Self::Approved)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Approved => "approved",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SupportStatus
// ---------------------------------------------------------------------------

/// Status of a backup-support request.
///
/// ```text
/// pending → approved
///         → rejected
/// ```
///
/// `rejected` is part of the stored vocabulary but no operation produces it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SupportStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl SupportStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SupportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// The kinds of records kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Incident,
    Volunteer,
    SupportRequest,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incident => "incident",
            Self::Volunteer => "volunteer",
            Self::SupportRequest => "support_request",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_status_serializes_snake_case() {
        let json = serde_json::to_string(&IncidentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: IncidentStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(parsed, IncidentStatus::Canceled);
    }

    #[test]
    fn display_matches_serde() {
        for status in IncidentStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn terminal_states() {
        let terminal: Vec<_> = IncidentStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![IncidentStatus::Closed, IncidentStatus::Canceled]);
    }

    #[test]
    fn only_approved_is_acceptable() {
        for status in IncidentStatus::ALL {
            assert_eq!(status.is_acceptable(), status == IncidentStatus::Approved);
        }
    }

    #[test]
    fn support_status_defaults_to_pending() {
        assert_eq!(SupportStatus::default(), SupportStatus::Pending);
    }
}
