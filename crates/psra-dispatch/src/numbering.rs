//! Member and incident numbering.
//!
//! Counters live in one JSON object under `psra_counters`: `incident` for
//! the global incident sequence and `member_{YY}` for each registration year.
//! Every increment runs inside a store transaction, so numbers handed out to
//! sessions sharing a store are unique and strictly increasing.

use std::collections::BTreeMap;

use chrono::Utc;
use psra_core::entities::{Counters, Incident, Volunteer};
use psra_core::errors::CoreError;
use psra_core::ids::{
    ENTITY_SUFFIX_LEN, extract_incident_number, extract_member_number, format_incident_id,
    format_volunteer_id, random_base36,
};
use psra_core::keys;
use psra_core::member_number::{
    self, MAX_SEQUENCE, MAX_YEAR_PREFIX, MIN_YEAR_PREFIX, MemberNumberInfo,
};
use psra_store::{StoreError, Transaction};
use serde::Serialize;

use crate::error::DispatchError;
use crate::service::DispatchService;

/// Snapshot of the numbering counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberingStats {
    /// Two-digit current year.
    pub current_year: u32,
    pub total_incidents: u64,
    pub total_members_this_year: u64,
    pub all_counters: Counters,
}

/// One number embedded in more than one stored ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateNumber {
    pub number: u64,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    pub duplicate_members: Vec<DuplicateNumber>,
    pub duplicate_incidents: Vec<DuplicateNumber>,
}

impl DuplicateReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.duplicate_members.is_empty() && self.duplicate_incidents.is_empty()
    }
}

fn current_year_prefix() -> u32 {
    member_number::year_prefix(&Utc::now())
}

/// `value + 1`, treating a counter already at `u64::MAX` as corrupt.
fn successor(name: &str, value: u64) -> Result<u64, DispatchError> {
    value.checked_add(1).ok_or_else(|| {
        StoreError::Corrupt {
            key: keys::COUNTERS.to_string(),
            reason: format!("counter '{name}' is at its maximum"),
        }
        .into()
    })
}

/// Increment `name` and return the new value.
pub(crate) fn bump_counter(tx: &mut Transaction<'_>, name: &str) -> Result<u64, DispatchError> {
    let mut counters: Counters = tx.read(keys::COUNTERS)?;
    let next = successor(name, counters.get(name).copied().unwrap_or(0))?;
    counters.insert(name.to_string(), next);
    tx.write(keys::COUNTERS, &counters)?;
    Ok(next)
}

fn require_year_prefix(year_prefix: u32) -> Result<(), DispatchError> {
    if member_number::is_valid_year_prefix(year_prefix) {
        return Ok(());
    }
    Err(CoreError::Validation(format!(
        "year prefix {year_prefix} is outside {MIN_YEAR_PREFIX}..={MAX_YEAR_PREFIX}"
    ))
    .into())
}

/// Member number for the `value`-th registration of `year_prefix`.
fn member_number_for(year_prefix: u32, value: u64) -> Result<u32, DispatchError> {
    let exhausted =
        || CoreError::Validation(format!("member numbers for year {year_prefix} are exhausted"));
    let sequence = u32::try_from(value)
        .ok()
        .filter(|sequence| *sequence <= MAX_SEQUENCE)
        .ok_or_else(exhausted)?;
    member_number::compose(year_prefix, sequence).ok_or_else(|| exhausted().into())
}

/// Next member number for `year_prefix`, skipping numbers already embedded in
/// stored volunteer IDs or recorded as `memberNo`.
pub(crate) fn allocate_member_number(
    tx: &mut Transaction<'_>,
    year_prefix: u32,
) -> Result<u32, DispatchError> {
    require_year_prefix(year_prefix)?;
    let counter = keys::member_counter(year_prefix);
    let mut counters: Counters = tx.read(keys::COUNTERS)?;
    let volunteers: Vec<Volunteer> = tx.read(keys::VOLUNTEERS)?;
    let taken: Vec<u32> = volunteers
        .iter()
        .flat_map(|v| [extract_member_number(&v.id), Some(v.member_no)])
        .flatten()
        .collect();

    let mut sequence = successor(&counter, counters.get(&counter).copied().unwrap_or(0))?;
    let mut number = member_number_for(year_prefix, sequence)?;
    while taken.contains(&number) {
        sequence = successor(&counter, sequence)?;
        number = member_number_for(year_prefix, sequence)?;
    }

    counters.insert(counter, sequence);
    tx.write(keys::COUNTERS, &counters)?;
    Ok(number)
}

pub(crate) fn incident_id(sequence: u64) -> Result<String, DispatchError> {
    let suffix = random_base36(ENTITY_SUFFIX_LEN)?;
    Ok(format_incident_id(sequence, Utc::now().timestamp_millis(), &suffix))
}

pub(crate) fn volunteer_id(member_no: u32) -> Result<String, DispatchError> {
    let suffix = random_base36(ENTITY_SUFFIX_LEN)?;
    Ok(format_volunteer_id(member_no, Utc::now().timestamp_millis(), &suffix))
}

fn duplicates<I>(ids: I) -> Vec<DuplicateNumber>
where
    I: IntoIterator<Item = (u64, String)>,
{
    let mut by_number: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for (number, id) in ids {
        by_number.entry(number).or_default().push(id);
    }
    by_number
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(number, ids)| DuplicateNumber { number, ids })
        .collect()
}

impl DispatchService {
    /// Next member number for the current year (`YY * 10000 + seq`).
    ///
    /// # Errors
    ///
    /// Store failures, or `Validation` once the year's 9999 numbers are used.
    pub fn next_member_number(&self) -> Result<u32, DispatchError> {
        self.next_member_number_for_year(current_year_prefix())
    }

    /// # Errors
    ///
    /// `Validation` if `year_prefix` is outside `20..=99` or the year's 9999
    /// numbers are used; store failures.
    pub fn next_member_number_for_year(&self, year_prefix: u32) -> Result<u32, DispatchError> {
        require_year_prefix(year_prefix)?;
        let counter = keys::member_counter(year_prefix);
        self.store().transact(|tx| {
            let value = bump_counter(tx, &counter)?;
            member_number_for(year_prefix, value)
        })
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn next_incident_sequence(&self) -> Result<u64, DispatchError> {
        self.store()
            .transact(|tx| bump_counter(tx, keys::INCIDENT_COUNTER))
    }

    /// `incident_{seq}_{epochMs}_{rand6}`, consuming one incident sequence.
    ///
    /// # Errors
    ///
    /// Store failures or an unavailable random source.
    pub fn generate_incident_id(&self) -> Result<String, DispatchError> {
        incident_id(self.next_incident_sequence()?)
    }

    /// `volunteer_{memberNo}_{epochMs}_{rand6}`, consuming one member number.
    ///
    /// # Errors
    ///
    /// Store failures or an unavailable random source.
    pub fn generate_volunteer_id(&self) -> Result<String, DispatchError> {
        volunteer_id(self.next_member_number()?)
    }

    /// Next current-year member number not already used by a stored volunteer.
    ///
    /// # Errors
    ///
    /// Store failures, or `Validation` once the year's numbers are used up.
    pub fn find_available_member_number(&self) -> Result<u32, DispatchError> {
        let year_prefix = current_year_prefix();
        self.store()
            .transact(|tx| allocate_member_number(tx, year_prefix))
    }

    #[must_use]
    pub fn is_valid_member_number(member_no: u32) -> bool {
        member_number::is_valid(member_no)
    }

    #[must_use]
    pub fn member_number_info(member_no: u32) -> Option<MemberNumberInfo> {
        member_number::info(member_no)
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn numbering_stats(&self) -> Result<NumberingStats, DispatchError> {
        let counters: Counters = self.store().read(keys::COUNTERS)?;
        let current_year = current_year_prefix();
        Ok(NumberingStats {
            current_year,
            total_incidents: counters.get(keys::INCIDENT_COUNTER).copied().unwrap_or(0),
            total_members_this_year: counters
                .get(&keys::member_counter(current_year))
                .copied()
                .unwrap_or(0),
            all_counters: counters,
        })
    }

    /// Forget every counter. Numbering restarts at 1; existing IDs are kept.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn reset_counters(&self) -> Result<(), DispatchError> {
        self.store().transact(|tx| {
            tx.remove(keys::COUNTERS);
            Ok::<_, DispatchError>(())
        })?;
        tracing::info!("numbering counters reset");
        Ok(())
    }

    /// Member and incident numbers embedded in more than one stored ID.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn check_for_duplicates(&self) -> Result<DuplicateReport, DispatchError> {
        let volunteers: Vec<Volunteer> = self.store().read(keys::VOLUNTEERS)?;
        let incidents: Vec<Incident> = self.store().read(keys::INCIDENTS)?;

        Ok(DuplicateReport {
            duplicate_members: duplicates(volunteers.into_iter().filter_map(|v| {
                extract_member_number(&v.id).map(|n| (u64::from(n), v.id))
            })),
            duplicate_incidents: duplicates(
                incidents
                    .into_iter()
                    .filter_map(|i| extract_incident_number(&i.id).map(|n| (n, i.id))),
            ),
        })
    }
}
