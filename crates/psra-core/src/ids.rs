//! ID prefixes, formatting, and parsing.
//!
//! Generated IDs embed a human-readable number, the wall-clock time in epoch
//! milliseconds, and a short random base-36 suffix, e.g.
//! `incident_42_1739000000000_k3j9zq`. The suffix keeps IDs distinct even if two
//! sessions end up with the same sequence number.

use anyhow::anyhow;

use crate::errors::CoreError;

pub const PREFIX_INCIDENT: &str = "incident";
pub const PREFIX_VOLUNTEER: &str = "volunteer";
pub const PREFIX_SUPPORT: &str = "sr";
pub const PREFIX_SENDER: &str = "sender";

/// Length of the random suffix on entity IDs.
pub const ENTITY_SUFFIX_LEN: usize = 6;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random lowercase base-36 string of the given length.
///
/// # Errors
///
/// Returns `CoreError::Other` if the OS random source is unavailable.
pub fn random_base36(len: usize) -> Result<String, CoreError> {
    let mut bytes = vec![0u8; len];
    getrandom::fill(&mut bytes).map_err(|e| anyhow!("failed to read random bytes: {e}"))?;
    Ok(bytes
        .iter()
        .map(|b| char::from(BASE36[usize::from(*b) % BASE36.len()]))
        .collect())
}

/// `incident_{seq}_{ts}_{suffix}`
#[must_use]
pub fn format_incident_id(sequence: u64, timestamp_ms: i64, suffix: &str) -> String {
    format!("{PREFIX_INCIDENT}_{sequence}_{timestamp_ms}_{suffix}")
}

/// `volunteer_{memberNo}_{ts}_{suffix}`
#[must_use]
pub fn format_volunteer_id(member_no: u32, timestamp_ms: i64, suffix: &str) -> String {
    format!("{PREFIX_VOLUNTEER}_{member_no}_{timestamp_ms}_{suffix}")
}

/// `sr{ts}_{suffix}`
#[must_use]
pub fn format_support_id(timestamp_ms: i64, suffix: &str) -> String {
    format!("{PREFIX_SUPPORT}{timestamp_ms}_{suffix}")
}

/// `sender_{ts}_{suffix}`
#[must_use]
pub fn format_sender_id(timestamp_ms: i64, suffix: &str) -> String {
    format!("{PREFIX_SENDER}_{timestamp_ms}_{suffix}")
}

/// Member number embedded in a volunteer ID, if any.
#[must_use]
pub fn extract_member_number(volunteer_id: &str) -> Option<u32> {
    embedded_number(volunteer_id, PREFIX_VOLUNTEER)?.parse().ok()
}

/// Incident sequence number embedded in an incident ID, if any.
#[must_use]
pub fn extract_incident_number(incident_id: &str) -> Option<u64> {
    embedded_number(incident_id, PREFIX_INCIDENT)?.parse().ok()
}

/// Digits between `{prefix}_` and the next `_`. Legacy IDs such as `"v1"` yield `None`.
fn embedded_number<'a>(id: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = id.strip_prefix(prefix)?.strip_prefix('_')?;
    let (digits, _) = rest.split_once('_')?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}
