//! Advisory slot suggestions for applicants the placer could not seat.

use crate::catalog::SlotCatalog;
use crate::data::SlotRef;
use crate::grid::AssignmentGrid;

/// Hands out the catalog's still-empty slots in ascending (day, batch, index) order,
/// one per unplaced applicant in the order given. Preferences are ignored and
/// the grid is left untouched. Once the empty slots run out every remaining
/// applicant gets `None`.
pub fn suggest_leftovers(
    catalog: &SlotCatalog,
    grid: &AssignmentGrid,
    unplaced: &[usize],
) -> Vec<(usize, Option<SlotRef>)> {
    let mut empty = catalog.slots().filter(|slot| grid.occupant(slot).is_none()).fuse();
    unplaced.iter().map(|&applicant| (applicant, empty.next())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Group, RawSlotCatalog};

    fn catalog() -> SlotCatalog {
        let raw: RawSlotCatalog =
            serde_json::from_str(r#"{"1": {"1": [0], "2": [0]}, "2": {"1": [0], "2": [0]}}"#).unwrap();
        SlotCatalog::new(&raw).unwrap()
    }

    #[test]
    fn suggests_earliest_empty_slot() {
        let catalog = catalog();
        let mut grid = AssignmentGrid::new(&catalog);
        grid.place(0, SlotRef::new(Group::new(1, 1), 0));

        let suggestions = suggest_leftovers(&catalog, &grid, &[1]);

        assert_eq!(suggestions, vec![(1, Some(SlotRef::new(Group::new(1, 2), 0)))]);
        assert_eq!(grid.placed_count(), 1);
    }

    #[test]
    fn suggestions_ascend_then_run_out() {
        let catalog = catalog();
        let mut grid = AssignmentGrid::new(&catalog);
        grid.place(0, SlotRef::new(Group::new(1, 2), 0));
        grid.place(1, SlotRef::new(Group::new(2, 2), 0));

        let suggestions = suggest_leftovers(&catalog, &grid, &[5, 3, 4, 2]);

        assert_eq!(
            suggestions,
            vec![
                (5, Some(SlotRef::new(Group::new(1, 1), 0))),
                (3, Some(SlotRef::new(Group::new(2, 1), 0))),
                (4, None),
                (2, None),
            ]
        );
    }

    #[test]
    fn nobody_unplaced_means_no_suggestions() {
        let catalog = catalog();
        assert!(suggest_leftovers(&catalog, &AssignmentGrid::new(&catalog), &[]).is_empty());
    }
}
