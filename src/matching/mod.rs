//! Maximum-weight assignment of applicants to slots.
//!
//! Every applicant may take at most one slot, every slot at most one
//! applicant, and an applicant may only take a slot in one of their
//! preferred groups. The objective is the summed weight of seated
//! applicants. Any engine that optimises this model can sit behind
//! [`MatchingEngine`].

mod augmenting;
mod ilp;

pub use augmenting::AugmentingPathEngine;
pub use ilp::HighsEngine;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::catalog::SlotCatalog;
use crate::data::{EngineKind, Group, SlotRef};
use crate::error::SolveError;
use crate::roster::Applicant;

/// An applicant that can take part in matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Roster index.
    pub applicant: usize,
    pub weight: f64,
    pub groups: Vec<Group>,
}

/// "applicant occupies slot"; only exists for slots in a preferred group.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionVariable {
    pub applicant: usize,
    pub weight: f64,
    pub slot: SlotRef,
}

pub struct MatchingProblem<'a> {
    catalog: &'a SlotCatalog,
    candidates: Vec<Candidate>,
}

impl<'a> MatchingProblem<'a> {
    /// `weights` is aligned with `applicants`; applicants without a weight or
    /// without a usable group are left out.
    pub fn new(catalog: &'a SlotCatalog, applicants: &[Applicant], weights: &[Option<f64>]) -> Self {
        let candidates = applicants
            .iter()
            .zip(weights)
            .enumerate()
            .filter_map(|(index, (applicant, weight))| {
                let weight = (*weight)?;
                let groups: Vec<Group> = applicant
                    .groups
                    .iter()
                    .filter(|g| catalog.contains(g))
                    .cloned()
                    .collect();
                (!groups.is_empty()).then_some(Candidate {
                    applicant: index,
                    weight,
                    groups,
                })
            })
            .collect();
        MatchingProblem { catalog, candidates }
    }

    pub fn catalog(&self) -> &SlotCatalog {
        self.catalog
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn decision_variables(&self) -> Vec<DecisionVariable> {
        let per_group = self.catalog.slots_per_group();
        self.candidates
            .iter()
            .flat_map(|c| {
                c.groups.iter().flat_map(move |group| {
                    (0..per_group).map(move |index| DecisionVariable {
                        applicant: c.applicant,
                        weight: c.weight,
                        slot: SlotRef::new(group.clone(), index),
                    })
                })
            })
            .collect()
    }
}

/// A feasible assignment. `placements` is sorted by applicant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matching {
    pub placements: Vec<(usize, SlotRef)>,
    pub objective: f64,
}

impl Matching {
    /// Checks the assignment against the model's constraints.
    pub fn verify(&self, problem: &MatchingProblem<'_>) -> Result<(), SolveError> {
        let candidates: HashMap<usize, &Candidate> =
            problem.candidates().iter().map(|c| (c.applicant, c)).collect();
        let mut seated = HashSet::new();
        let mut taken = HashSet::new();

        for (applicant, slot) in &self.placements {
            let candidate = candidates.get(applicant).ok_or_else(|| {
                SolveError::InvalidSolution(format!("applicant #{applicant} is not a candidate"))
            })?;
            if !candidate.groups.contains(&slot.group) || slot.index >= problem.catalog().slots_per_group() {
                return Err(SolveError::InvalidSolution(format!(
                    "applicant #{applicant} placed at {slot}, outside their preferences"
                )));
            }
            if !seated.insert(*applicant) {
                return Err(SolveError::InvalidSolution(format!(
                    "applicant #{applicant} placed more than once"
                )));
            }
            if !taken.insert(slot) {
                return Err(SolveError::InvalidSolution(format!("slot {slot} holds more than one applicant")));
            }
        }
        Ok(())
    }
}

pub trait MatchingEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, problem: &MatchingProblem<'_>) -> Result<Matching, SolveError>;
}

pub fn engine_for(kind: EngineKind, time_limit: Option<Duration>) -> Box<dyn MatchingEngine> {
    match kind {
        EngineKind::Highs => Box::new(HighsEngine::new(time_limit)),
        EngineKind::Augmenting => Box::new(AugmentingPathEngine),
    }
}

/// Total weight of `placements`.
fn objective_of(problem: &MatchingProblem<'_>, placements: &[(usize, SlotRef)]) -> f64 {
    let weights: HashMap<usize, f64> = problem.candidates().iter().map(|c| (c.applicant, c.weight)).collect();
    placements.iter().filter_map(|(applicant, _)| weights.get(applicant)).sum()
}
