//! Error types for catalog validation, matching, loading and the run as a whole.

use std::path::PathBuf;
use thiserror::Error;

use crate::data::Label;

/// Structural problems with the slot catalog. These abort a run before
/// any placement happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("slot catalog has no days")]
    NoDays,

    #[error("day {day} has no batches")]
    NoBatches { day: Label },

    #[error("day {day} is missing batch {batch} that other days expose")]
    MissingBatch { day: Label, batch: Label },

    #[error("day {day} exposes batch {batch} that the first day does not")]
    UnexpectedBatch { day: Label, batch: Label },

    #[error("group ({day}, {batch}) has {found} slots, expected {expected}")]
    NonUniformGroup {
        day: Label,
        batch: Label,
        expected: usize,
        found: usize,
    },

    #[error("slot groups have no indices")]
    EmptyGroups,
}

/// Failure of a matching engine. Never fatal: the pipeline falls back to
/// greedy placement.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("solver error: {0}")]
    Solver(#[from] good_lp::ResolutionError),

    #[error("solver returned an invalid assignment: {0}")]
    InvalidSolution(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Fatal errors for one scheduling run.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("malformed slot catalog: {0}")]
    Catalog(#[from] CatalogError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
