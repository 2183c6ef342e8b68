//! The assignment grid: one cell per slot, each holding at most one applicant.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::SlotCatalog;
use crate::data::{Group, Schedule, SlotRef};
use crate::roster::Roster;

/// Applicants are referred to by their position in the roster.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentGrid {
    cells: BTreeMap<Group, Vec<Option<usize>>>,
    positions: HashMap<usize, SlotRef>,
}

impl AssignmentGrid {
    pub fn new(catalog: &SlotCatalog) -> Self {
        let cells = catalog
            .groups()
            .map(|group| (group.clone(), vec![None; catalog.slots_per_group()]))
            .collect();
        AssignmentGrid {
            cells,
            positions: HashMap::new(),
        }
    }

    pub fn occupant(&self, slot: &SlotRef) -> Option<usize> {
        self.cells.get(&slot.group)?.get(slot.index).copied().flatten()
    }

    pub fn group_cells(&self, group: &Group) -> Option<&[Option<usize>]> {
        self.cells.get(group).map(Vec::as_slice)
    }

    pub fn position(&self, applicant: usize) -> Option<&SlotRef> {
        self.positions.get(&applicant)
    }

    pub fn is_placed(&self, applicant: usize) -> bool {
        self.positions.contains_key(&applicant)
    }

    pub fn placed_count(&self) -> usize {
        self.positions.len()
    }

    /// Seats `applicant` at `slot`. Refuses (returns false) if the slot does
    /// not exist, is taken, or the applicant already has a seat.
    pub fn place(&mut self, applicant: usize, slot: SlotRef) -> bool {
        if self.is_placed(applicant) {
            return false;
        }
        let Some(cell) = self
            .cells
            .get_mut(&slot.group)
            .and_then(|cells| cells.get_mut(slot.index))
        else {
            return false;
        };
        if cell.is_some() {
            return false;
        }
        *cell = Some(applicant);
        self.positions.insert(applicant, slot);
        true
    }

    /// Placed roster indices in ascending order.
    pub fn placed(&self) -> Vec<usize> {
        let mut placed: Vec<usize> = self.positions.keys().copied().collect();
        placed.sort_unstable();
        placed
    }

    pub fn to_schedule(&self, roster: &Roster) -> Schedule {
        let mut schedule = Schedule::new();
        for (group, cells) in &self.cells {
            let occupants = cells
                .iter()
                .map(|cell| cell.and_then(|i| roster.applicants().get(i)).map(|a| a.id.clone()))
                .collect();
            schedule
                .entry(group.day.clone())
                .or_default()
                .insert(group.batch.clone(), occupants);
        }
        schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawSlotCatalog;

    fn catalog() -> SlotCatalog {
        let raw: RawSlotCatalog = serde_json::from_str(r#"{"1": {"1": [0, 1]}, "2": {"1": [0, 1]}}"#).unwrap();
        SlotCatalog::new(&raw).unwrap()
    }

    #[test]
    fn place_enforces_unit_capacity_on_both_sides() {
        let mut grid = AssignmentGrid::new(&catalog());
        let slot = SlotRef::new(Group::new(1, 1), 1);

        assert!(grid.place(0, slot.clone()));
        assert!(!grid.place(1, slot.clone()), "slot already taken");
        assert!(!grid.place(0, SlotRef::new(Group::new(2, 1), 0)), "applicant already seated");
        assert!(!grid.place(2, SlotRef::new(Group::new(1, 1), 2)), "index out of range");
        assert!(!grid.place(2, SlotRef::new(Group::new(3, 1), 0)), "unknown group");

        assert_eq!(grid.occupant(&slot), Some(0));
        assert_eq!(grid.position(0), Some(&slot));
        assert_eq!(grid.placed_count(), 1);
    }
}
