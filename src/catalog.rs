//! Validated slot catalog.

use std::collections::BTreeMap;

use crate::data::{Group, Label, RawSlotCatalog, SlotRef};
use crate::error::CatalogError;

/// A slot catalog whose every (day, batch) group exposes the same number of
/// indices. Built once per run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct SlotCatalog {
    slots_per_group: usize,
    start_times: BTreeMap<Group, Vec<Label>>,
}

impl SlotCatalog {
    /// Validates the raw catalog. Every day must expose the batch set of the
    /// first day and every group the same, non-zero, number of slots.
    pub fn new(raw: &RawSlotCatalog) -> Result<Self, CatalogError> {
        let (first_day, first_batches) = raw.iter().next().ok_or(CatalogError::NoDays)?;
        let slots_per_group = first_batches
            .values()
            .next()
            .map(Vec::len)
            .ok_or_else(|| CatalogError::NoBatches {
                day: first_day.clone(),
            })?;
        if slots_per_group == 0 {
            return Err(CatalogError::EmptyGroups);
        }

        let mut start_times = BTreeMap::new();
        for (day, batches) in raw {
            if batches.is_empty() {
                return Err(CatalogError::NoBatches { day: day.clone() });
            }
            if let Some(batch) = first_batches.keys().find(|b| !batches.contains_key(*b)) {
                return Err(CatalogError::MissingBatch {
                    day: day.clone(),
                    batch: batch.clone(),
                });
            }
            for (batch, starts) in batches {
                if !first_batches.contains_key(batch) {
                    return Err(CatalogError::UnexpectedBatch {
                        day: day.clone(),
                        batch: batch.clone(),
                    });
                }
                if starts.len() != slots_per_group {
                    return Err(CatalogError::NonUniformGroup {
                        day: day.clone(),
                        batch: batch.clone(),
                        expected: slots_per_group,
                        found: starts.len(),
                    });
                }
                start_times.insert(Group::new(day.clone(), batch.clone()), starts.clone());
            }
        }

        Ok(SlotCatalog {
            slots_per_group,
            start_times,
        })
    }

    pub fn slots_per_group(&self) -> usize {
        self.slots_per_group
    }

    pub fn group_count(&self) -> usize {
        self.start_times.len()
    }

    pub fn slot_count(&self) -> usize {
        self.group_count() * self.slots_per_group
    }

    pub fn contains(&self, group: &Group) -> bool {
        self.start_times.contains_key(group)
    }

    /// Groups in ascending (day, batch) order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.start_times.keys()
    }

    /// Every slot in ascending (day, batch, index) order.
    pub fn slots(&self) -> impl Iterator<Item = SlotRef> + '_ {
        self.groups().flat_map(move |group| {
            (0..self.slots_per_group).map(move |index| SlotRef::new(group.clone(), index))
        })
    }

    pub fn start_time(&self, slot: &SlotRef) -> Option<&Label> {
        self.start_times.get(&slot.group)?.get(slot.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawSlotCatalog {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn accepts_uniform_catalog() {
        let catalog = SlotCatalog::new(&raw(
            r#"{"1": {"1": ["08:00", "08:30"], "2": ["13:00", "13:30"]},
                "2": {"1": ["08:00", "08:30"], "2": ["13:00", "13:30"]}}"#,
        ))
        .unwrap();

        assert_eq!(catalog.slots_per_group(), 2);
        assert_eq!(catalog.group_count(), 4);
        assert_eq!(catalog.slot_count(), 8);
        assert!(catalog.contains(&Group::new(2, 1)));
        assert!(!catalog.contains(&Group::new(3, 1)));

        let slot = SlotRef::new(Group::new(1, 2), 1);
        assert_eq!(catalog.start_time(&slot).map(Label::as_str), Some("13:30"));
    }

    #[test]
    fn slots_are_enumerated_in_ascending_order() {
        let catalog = SlotCatalog::new(&raw(
            r#"{"10": {"1": [0]}, "2": {"1": [0]}, "1": {"1": [0]}}"#,
        ))
        .unwrap();
        let slots: Vec<SlotRef> = catalog.slots().collect();
        let mut sorted = slots.clone();
        sorted.sort();
        assert_eq!(slots, sorted);
        let days: Vec<&str> = slots.iter().map(|s| s.group.day.as_str()).collect();
        assert_eq!(days, vec!["1", "2", "10"]);
    }

    #[test]
    fn rejects_empty_catalog() {
        assert_eq!(SlotCatalog::new(&raw("{}")).unwrap_err(), CatalogError::NoDays);
        assert_eq!(
            SlotCatalog::new(&raw(r#"{"1": {"1": []}}"#)).unwrap_err(),
            CatalogError::EmptyGroups
        );
        assert_eq!(
            SlotCatalog::new(&raw(r#"{"1": {}}"#)).unwrap_err(),
            CatalogError::NoBatches { day: Label::from(1) }
        );
    }

    #[test]
    fn rejects_non_uniform_group_sizes() {
        let err = SlotCatalog::new(&raw(r#"{"1": {"1": [0, 1]}, "2": {"1": [0]}}"#)).unwrap_err();
        assert_eq!(
            err,
            CatalogError::NonUniformGroup {
                day: Label::from(2),
                batch: Label::from(1),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn rejects_mismatched_batch_sets() {
        let err = SlotCatalog::new(&raw(r#"{"1": {"1": [0], "2": [0]}, "2": {"1": [0]}}"#)).unwrap_err();
        assert_eq!(
            err,
            CatalogError::MissingBatch {
                day: Label::from(2),
                batch: Label::from(2),
            }
        );

        let err = SlotCatalog::new(&raw(r#"{"1": {"1": [0]}, "2": {"1": [0], "3": [0]}}"#)).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnexpectedBatch {
                day: Label::from(2),
                batch: Label::from(3),
            }
        );
    }
}
