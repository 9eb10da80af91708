//! Member number arithmetic.
//!
//! A member number is `YY * 10000 + sequence`, where `YY` is the two-digit
//! registration year and `sequence` a per-year counter in `1..=9999`.

use chrono::Datelike;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const YEAR_FACTOR: u32 = 10_000;
pub const MIN_YEAR_PREFIX: u32 = 20;
pub const MAX_YEAR_PREFIX: u32 = 99;
pub const MAX_SEQUENCE: u32 = 9_999;

/// Two-digit year prefix for a date, e.g. 25 for 2025.
#[must_use]
pub fn year_prefix<D: Datelike>(date: &D) -> u32 {
    date.year().rem_euclid(100).unsigned_abs()
}

/// `year_prefix * 10000 + sequence`; `None` on overflow.
#[must_use]
pub const fn compose(year_prefix: u32, sequence: u32) -> Option<u32> {
    match year_prefix.checked_mul(YEAR_FACTOR) {
        Some(base) => base.checked_add(sequence),
        None => None,
    }
}

/// Whether `year_prefix` falls in `20..=99`.
#[must_use]
pub const fn is_valid_year_prefix(year_prefix: u32) -> bool {
    year_prefix >= MIN_YEAR_PREFIX && year_prefix <= MAX_YEAR_PREFIX
}

#[must_use]
pub const fn year_of(member_no: u32) -> u32 {
    member_no / YEAR_FACTOR
}

#[must_use]
pub const fn sequence_of(member_no: u32) -> u32 {
    member_no % YEAR_FACTOR
}

/// Year prefix in `20..=99` and sequence in `1..=9999`.
#[must_use]
pub const fn is_valid(member_no: u32) -> bool {
    let year = year_of(member_no);
    let sequence = sequence_of(member_no);
    year >= MIN_YEAR_PREFIX && year <= MAX_YEAR_PREFIX && sequence >= 1 && sequence <= MAX_SEQUENCE
}

/// Decoded view of a member number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberNumberInfo {
    pub member_no: u32,
    /// Full year, e.g. 2025.
    pub year: u32,
    pub year_prefix: u32,
    pub sequence: u32,
    /// `"2025-0007"`
    pub formatted: String,
}

/// Decode a member number; `None` when it is not valid.
#[must_use]
pub fn info(member_no: u32) -> Option<MemberNumberInfo> {
    if !is_valid(member_no) {
        return None;
    }
    let year_prefix = year_of(member_no);
    let sequence = sequence_of(member_no);
    let year = 2000 + year_prefix;
    Some(MemberNumberInfo {
        member_no,
        year,
        year_prefix,
        sequence,
        formatted: format!("{year}-{sequence:04}"),
    })
}
