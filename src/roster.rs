//! Applicants checked against the slot catalog.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::warn;
use std::collections::{HashMap, HashSet};

use crate::catalog::SlotCatalog;
use crate::data::{ApplicantId, Group, InputIssue, PreferenceRecord, Preferences};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// An applicant as seen by the engine. `groups` only holds groups that exist
/// in the catalog, in the applicant's order, without repeats.
#[derive(Debug, Clone, PartialEq)]
pub struct Applicant {
    pub id: ApplicantId,
    pub submitted_at: Option<DateTime<Utc>>,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    applicants: Vec<Applicant>,
    issues: Vec<InputIssue>,
}

impl Roster {
    /// Builds the roster in submission order. Bad entries are dropped and
    /// reported rather than failing the run.
    ///
    /// An id that appears more than once keeps the position of its first
    /// appearance and the contents of its last.
    pub fn build(catalog: &SlotCatalog, preferences: &Preferences) -> Self {
        let mut roster = Roster::default();
        let latest: HashMap<&str, &PreferenceRecord> =
            preferences.iter().map(|(id, record)| (id.as_str(), record)).collect();
        let mut seen: HashSet<&str> = HashSet::new();

        for (id, record) in preferences.iter() {
            if !seen.insert(id.as_str()) {
                warn!("Applicant {id} submitted twice; keeping the last record");
                roster.issues.push(InputIssue::DuplicateApplicant { applicant: id.clone() });
                continue;
            }
            let record = latest.get(id.as_str()).copied().unwrap_or(record);

            let Some(submitted_at) = parse_timestamp(&record.timestamp) else {
                warn!("Applicant {id} has unparsable timestamp '{}'", record.timestamp);
                roster.issues.push(InputIssue::UnparsableTimestamp {
                    applicant: id.clone(),
                    timestamp: record.timestamp.clone(),
                });
                roster.applicants.push(Applicant {
                    id: id.clone(),
                    submitted_at: None,
                    groups: Vec::new(),
                });
                continue;
            };

            for entry in &record.unreadable {
                warn!("Applicant {id} listed {entry}, which is not a (day, batch) pair");
                roster.issues.push(InputIssue::UnreadablePreference {
                    applicant: id.clone(),
                    entry: entry.clone(),
                });
            }

            let mut groups: Vec<Group> = Vec::with_capacity(record.preferences.len());
            for (day, batch) in &record.preferences {
                let group = Group::new(day.clone(), batch.clone());
                if !catalog.contains(&group) {
                    warn!("Applicant {id} prefers {group}, which is not in the slot catalog");
                    roster.issues.push(InputIssue::UnknownGroup {
                        applicant: id.clone(),
                        day: day.clone(),
                        batch: batch.clone(),
                    });
                } else if !groups.contains(&group) {
                    groups.push(group);
                }
            }
            if groups.is_empty() {
                roster.issues.push(InputIssue::NoUsablePreferences { applicant: id.clone() });
            }

            roster.applicants.push(Applicant {
                id: id.clone(),
                submitted_at: Some(submitted_at),
                groups,
            });
        }

        roster
    }

    pub fn applicants(&self) -> &[Applicant] {
        &self.applicants
    }

    pub fn issues(&self) -> &[InputIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.applicants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applicants.is_empty()
    }
}

/// Parses an ISO-8601 submission time. Timestamps without an offset are
/// read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
