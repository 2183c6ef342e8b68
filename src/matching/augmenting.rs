use log::info;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use super::{Candidate, Matching, MatchingEngine, MatchingProblem, objective_of};
use crate::data::{Group, SlotRef};
use crate::error::SolveError;

/// Combinatorial engine. Slots in a group are interchangeable, so the model
/// reduces to matching applicants into groups of fixed capacity. Candidates
/// are inserted heaviest first (ties in roster order), each through an
/// augmenting path that may move already seated applicants between their
/// groups but never unseats one. Seatable applicant sets form a matroid, so
/// this greedy order yields a maximum-weight assignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct AugmentingPathEngine;

impl MatchingEngine for AugmentingPathEngine {
    fn name(&self) -> &'static str {
        "augmenting"
    }

    fn solve(&self, problem: &MatchingProblem<'_>) -> Result<Matching, SolveError> {
        let start_time = Instant::now();
        let candidates = problem.candidates();

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| candidates[b].weight.total_cmp(&candidates[a].weight));

        let mut augmenter = Augmenter {
            candidates,
            capacity: problem.catalog().slots_per_group(),
            members: BTreeMap::new(),
        };
        for candidate in order {
            let mut visited = HashSet::new();
            augmenter.augment(candidate, &mut visited);
        }

        // lay each group out in roster order
        let mut placements = Vec::new();
        for (group, mut members) in augmenter.members {
            members.sort_unstable();
            for (index, member) in members.into_iter().enumerate() {
                placements.push((candidates[member].applicant, SlotRef::new(group.clone(), index)));
            }
        }
        placements.sort();

        let objective = objective_of(problem, &placements);
        info!(
            "Augmenting-path matching seated {} of {} candidates in {:.2?}",
            placements.len(),
            candidates.len(),
            start_time.elapsed()
        );
        Ok(Matching { placements, objective })
    }
}

struct Augmenter<'p> {
    candidates: &'p [Candidate],
    capacity: usize,
    /// Candidate positions seated in each group.
    members: BTreeMap<&'p Group, Vec<usize>>,
}

impl<'p> Augmenter<'p> {
    fn augment(&mut self, candidate: usize, visited: &mut HashSet<&'p Group>) -> bool {
        let candidates = self.candidates;
        for group in &candidates[candidate].groups {
            if !visited.insert(group) {
                continue;
            }

            let members = self.members.entry(group).or_default();
            if members.len() < self.capacity {
                members.push(candidate);
                return true;
            }

            let seated = members.clone();
            for (seat, other) in seated.into_iter().enumerate() {
                if self.augment(other, visited) {
                    // `other` moved elsewhere; take over its seat
                    if let Some(members) = self.members.get_mut(group) {
                        members[seat] = candidate;
                    }
                    return true;
                }
            }
        }
        false
    }
}
