//! First-fit placement with a forward-only cursor per group.

use log::trace;
use std::collections::HashMap;

use crate::catalog::SlotCatalog;
use crate::data::{Group, SlotRef};
use crate::grid::AssignmentGrid;
use crate::roster::Applicant;

/// Walks applicants in the given order and seats each one in the first empty
/// slot, at or after the group's cursor, of the first preferred group that
/// has one. Slots behind a cursor are never revisited, so a full pass is
/// linear in the number of slots. Weights play no part.
#[derive(Debug, Clone)]
pub struct GreedyPlacer {
    cursors: HashMap<Group, usize>,
}

impl GreedyPlacer {
    pub fn new(catalog: &SlotCatalog) -> Self {
        GreedyPlacer {
            cursors: catalog.groups().map(|group| (group.clone(), 0)).collect(),
        }
    }

    /// Next index the placer will look at in `group`.
    pub fn cursor(&self, group: &Group) -> Option<usize> {
        self.cursors.get(group).copied()
    }

    /// Places every applicant of `order` that is not already in `grid` and
    /// returns, in order, those that found no slot.
    pub fn place<I>(&mut self, grid: &mut AssignmentGrid, applicants: &[Applicant], order: I) -> Vec<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut unplaced = Vec::new();
        for applicant in order {
            if grid.is_placed(applicant) {
                continue;
            }
            let groups = applicants.get(applicant).map_or(&[][..], |a| a.groups.as_slice());
            match self.place_one(grid, applicant, groups) {
                Some(slot) => trace!("Greedy placed applicant #{applicant} at {slot}"),
                None => unplaced.push(applicant),
            }
        }
        unplaced
    }

    fn place_one(&mut self, grid: &mut AssignmentGrid, applicant: usize, groups: &[Group]) -> Option<SlotRef> {
        for group in groups {
            let Some(cursor) = self.cursors.get_mut(group) else {
                continue;
            };
            let Some(index) = grid
                .group_cells(group)
                .and_then(|cells| cells.get(*cursor..)?.iter().position(Option::is_none))
                .map(|offset| *cursor + offset)
            else {
                continue;
            };

            let slot = SlotRef::new(group.clone(), index);
            if grid.place(applicant, slot.clone()) {
                *cursor = index + 1;
                return Some(slot);
            }
        }
        None
    }
}
