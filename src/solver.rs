use itertools::Itertools;
use log::{info, warn};
use std::time::{Duration, Instant};

use crate::catalog::SlotCatalog;
use crate::data::{
    EngineKind, Preferences, RawSlotCatalog, SchedulingInput, SchedulingOutput, SlotRef,
    SlotSuggestion, Strategy, Unallocated,
};
use crate::error::ScheduleResult;
use crate::greedy::GreedyPlacer;
use crate::grid::AssignmentGrid;
use crate::leftover::suggest_leftovers;
use crate::matching::{Matching, MatchingEngine, MatchingProblem, engine_for};
use crate::roster::Roster;
use crate::weight::weigh;

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10);

/// Run-wide solver settings. A request may override the strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub strategy: Strategy,
    pub engine: EngineKind,
    /// Budget for one matching solve; `None` means unbounded.
    pub time_limit: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            strategy: Strategy::default(),
            engine: EngineKind::default(),
            time_limit: Some(DEFAULT_TIME_LIMIT),
        }
    }
}

/// Solves one scheduling request with the configured engine.
pub fn solve(input: &SchedulingInput, config: &SolverConfig) -> ScheduleResult<SchedulingOutput> {
    let strategy = input.strategy.unwrap_or(config.strategy);
    let engine = engine_for(config.engine, config.time_limit);
    solve_with_engine(&input.slots, &input.preferences, strategy, engine.as_ref())
}

/// Builds the assignment grid and the leftover suggestions.
///
/// With [`Strategy::Optimal`] the engine's matching seeds the grid and the
/// greedy pass only fills what it left open. If the engine fails or returns
/// something that breaks the model's constraints, the run continues with the
/// greedy pass alone and records why.
pub fn solve_with_engine(
    slots: &RawSlotCatalog,
    preferences: &Preferences,
    strategy: Strategy,
    engine: &dyn MatchingEngine,
) -> ScheduleResult<SchedulingOutput> {
    let start_time = Instant::now();
    let catalog = SlotCatalog::new(slots)?;
    let roster = Roster::build(&catalog, preferences);
    info!(
        "Scheduling {} applicants into {} slots ({} groups of {}) with the {} strategy...",
        roster.len(),
        catalog.slot_count(),
        catalog.group_count(),
        catalog.slots_per_group(),
        strategy
    );

    let weights = weigh(roster.applicants());
    let mut grid = AssignmentGrid::new(&catalog);
    let mut used = strategy;
    let mut fallback_reason = None;

    if strategy == Strategy::Optimal {
        let problem = MatchingProblem::new(&catalog, roster.applicants(), &weights);
        info!("Solving weighted matching with the {} engine...", engine.name());
        let solved = engine
            .solve(&problem)
            .and_then(|matching| matching.verify(&problem).map(|()| matching));
        match solved {
            Ok(matching) => {
                info!(
                    "Optimal matching seats {} applicants with total weight {:.4}",
                    matching.placements.len(),
                    matching.objective
                );
                seed_grid(&mut grid, &matching);
            }
            Err(e) => {
                warn!("No optimal improvement found ({e}); falling back to greedy placement");
                used = Strategy::Greedy;
                fallback_reason = Some(e.to_string());
            }
        }
    }

    let unplaced = GreedyPlacer::new(&catalog).place(&mut grid, roster.applicants(), 0..roster.len());
    let suggestions = suggest_leftovers(&catalog, &grid, &unplaced);

    let placed = grid.placed();
    let total_weight: f64 = placed.iter().filter_map(|&a| weights.get(a).copied().flatten()).sum();
    info!(
        "Placed {} of {} applicants in {:.2?}; {} left over",
        placed.len(),
        roster.len(),
        start_time.elapsed(),
        unplaced.len()
    );

    let unallocated = Unallocated(
        suggestions
            .into_iter()
            .map(|(applicant, slot)| {
                let suggestion = slot.map(|slot| SlotSuggestion {
                    start_time: catalog.start_time(&slot).cloned(),
                    day: slot.group.day,
                    batch: slot.group.batch,
                    index: slot.index,
                });
                (roster.applicants()[applicant].id.clone(), suggestion)
            })
            .collect(),
    );

    Ok(SchedulingOutput {
        schedule: grid.to_schedule(&roster),
        unallocated,
        strategy: used,
        fallback_reason,
        placed_count: placed.len(),
        total_weight,
        issues: roster.issues().to_vec(),
    })
}

/// Seats a matching in the grid. Indices within a group are interchangeable,
/// so each group's members take indices 0.. in roster order.
fn seed_grid(grid: &mut AssignmentGrid, matching: &Matching) {
    let by_group = matching
        .placements
        .iter()
        .map(|(applicant, slot)| (&slot.group, *applicant))
        .into_group_map();

    for (group, mut members) in by_group.into_iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        members.sort_unstable();
        for (index, applicant) in members.into_iter().enumerate() {
            grid.place(applicant, SlotRef::new(group.clone(), index));
        }
    }
}
