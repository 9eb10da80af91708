//! Fixed store keys.
//!
//! Every collection lives under one key and is rewritten as a whole.

pub const INCIDENTS: &str = "psra_incidents";
pub const VOLUNTEERS: &str = "psra_volunteers";
pub const SUPPORT_REQUESTS: &str = "psra_support_requests";
pub const COUNTERS: &str = "psra_counters";

/// Key the store-signal relay transport writes envelopes under.
pub const NOTIFICATION_FALLBACK: &str = "psra_notification_fallback";

/// Prefix shared by every key the application owns.
pub const PREFIX: &str = "psra_";

/// Session keys that survive "clear all data".
pub const PRESERVED_SESSION_KEYS: [&str; 3] = ["psra_role", "psra_name", "psra_dispatcher_id"];

/// Counter name for incident sequence numbers.
pub const INCIDENT_COUNTER: &str = "incident";

/// Counter name for member numbers issued in the given two-digit year.
#[must_use]
pub fn member_counter(year_prefix: u32) -> String {
    format!("member_{year_prefix}")
}

/// Whether "clear all data" removes this key.
#[must_use]
pub fn is_clearable(key: &str) -> bool {
    key.starts_with(PREFIX) && !PRESERVED_SESSION_KEYS.contains(&key)
}
