//! Submission-time weighting.
//!
//! `weight = 0.7 * strength + 0.3 / (1 + hours_late)`, where `hours_late` is
//! measured from the earliest submission in the run and `strength` is the
//! same for every listed preference.

use chrono::{DateTime, Utc};

use crate::roster::Applicant;

pub const PREFERENCE_STRENGTH: f64 = 1.0;
pub const STRENGTH_SHARE: f64 = 0.7;
pub const TIMESTAMP_SHARE: f64 = 0.3;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// In (0, 1]; 1 for the earliest submitter.
pub fn time_weight(hours_late: f64) -> f64 {
    1.0 / (1.0 + hours_late)
}

pub fn combined_weight(hours_late: f64) -> f64 {
    STRENGTH_SHARE * PREFERENCE_STRENGTH + TIMESTAMP_SHARE * time_weight(hours_late)
}

/// Weight per applicant, aligned with `applicants`. Applicants without a
/// usable timestamp get `None` and take no part in matching.
pub fn weigh(applicants: &[Applicant]) -> Vec<Option<f64>> {
    let Some(earliest) = applicants.iter().filter_map(|a| a.submitted_at).min() else {
        return vec![None; applicants.len()];
    };

    applicants
        .iter()
        .map(|a| a.submitted_at.map(|at| combined_weight(hours_between(earliest, at))))
        .collect()
}

fn hours_between(earliest: DateTime<Utc>, at: DateTime<Utc>) -> f64 {
    (at - earliest).num_milliseconds() as f64 / MILLIS_PER_HOUR
}
