use good_lp::variable;
use good_lp::{Expression, ProblemVariables, Solution, SolverModel, Variable, constraint, default_solver};
use log::{info, trace};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::{Matching, MatchingEngine, MatchingProblem, objective_of};
use crate::data::SlotRef;
use crate::error::SolveError;

/// Solves the assignment as a binary integer program with HiGHS.
#[derive(Debug, Clone, Default)]
pub struct HighsEngine {
    time_limit: Option<Duration>,
}

impl HighsEngine {
    pub fn new(time_limit: Option<Duration>) -> Self {
        HighsEngine { time_limit }
    }
}

impl MatchingEngine for HighsEngine {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, problem: &MatchingProblem<'_>) -> Result<Matching, SolveError> {
        let start_time = Instant::now();
        let decisions = problem.decision_variables();

        info!(
            "Setting up ILP model with {} candidates and {} slots...",
            problem.candidates().len(),
            problem.catalog().slot_count()
        );
        trace!(
            "Generated {} decision variables out of a theoretical maximum of {}.",
            decisions.len(),
            problem.candidates().len() * problem.catalog().slot_count()
        );

        // the empty assignment is the only (and optimal) one
        if decisions.is_empty() {
            return Ok(Matching::default());
        }

        // x_asi = 1 if applicant a sits in slot i of group s
        //         0 otherwise
        let mut vars = ProblemVariables::new();
        let x = vars.add_vector(variable().binary(), decisions.len());

        let objective: Expression = decisions
            .iter()
            .zip(&x)
            .map(|(decision, var)| decision.weight * *var)
            .sum();

        let mut by_applicant: BTreeMap<usize, Vec<Variable>> = BTreeMap::new();
        let mut by_slot: BTreeMap<&SlotRef, Vec<Variable>> = BTreeMap::new();
        for (decision, var) in decisions.iter().zip(&x) {
            by_applicant.entry(decision.applicant).or_default().push(*var);
            by_slot.entry(&decision.slot).or_default().push(*var);
        }

        let mut model = vars
            .maximise(objective)
            .using(default_solver)
            .set_option("threads", 1) // limit to 1 thread for reproducibility
            .set_option("random_seed", 1234) // set seed for reproducibility
            .set_option("log_to_console", "false");
        if let Some(limit) = self.time_limit {
            model = model.set_option("time_limit", limit.as_secs_f64());
        }

        // at most one slot per applicant
        info!("Adding 'one slot per applicant' constraints...");
        for applicant_vars in by_applicant.values() {
            let seated: Expression = applicant_vars.iter().copied().sum();
            model.add_constraint(constraint!(seated <= 1));
        }

        // at most one applicant per slot
        info!("Adding 'one applicant per slot' constraints...");
        for slot_vars in by_slot.values() {
            let occupied: Expression = slot_vars.iter().copied().sum();
            model.add_constraint(constraint!(occupied <= 1));
        }

        info!("Starting ILP solver...");
        let solution = model.solve()?;
        info!("Solution found in {:.2?}", start_time.elapsed());

        let mut placements: Vec<(usize, SlotRef)> = decisions
            .iter()
            .zip(&x)
            .filter(|(_, var)| solution.value(**var) > 0.9)
            .map(|(decision, _)| (decision.applicant, decision.slot.clone()))
            .collect();
        placements.sort();

        let objective = objective_of(problem, &placements);
        Ok(Matching { placements, objective })
    }
}
