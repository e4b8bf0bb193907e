//! Location hierarchy and retired-location imputation

use crate::dataset::BurdenDataset;
use crate::error::DatasetError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Hierarchy level of admin-2 units in the LSAE location set.
pub const ADMIN2_LEVEL: u8 = 5;

#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("Duplicate location_id in hierarchy: {0}")]
    DuplicateLocation(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyEntry {
    pub location_id: i64,
    pub parent_id: i64,
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

/// Parent/level lookup over a location set, preserving file order.
#[derive(Debug, Clone)]
pub struct LocationHierarchy {
    entries: Vec<HierarchyEntry>,
    by_id: HashMap<i64, usize>,
}

impl LocationHierarchy {
    pub fn from_entries(entries: Vec<HierarchyEntry>) -> Result<Self, HierarchyError> {
        let mut by_id = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if by_id.insert(entry.location_id, idx).is_some() {
                return Err(HierarchyError::DuplicateLocation(entry.location_id));
            }
        }
        Ok(Self { entries, by_id })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HierarchyEntry] {
        &self.entries
    }

    pub fn parent_of(&self, location_id: i64) -> Option<i64> {
        self.by_id
            .get(&location_id)
            .map(|&idx| self.entries[idx].parent_id)
    }

    pub fn contains(&self, location_id: i64) -> bool {
        self.by_id.contains_key(&location_id)
    }

    pub fn location_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|e| e.location_id)
    }

    /// Restrict to admin-2 entries (level 5).
    pub fn admin2_subset(&self) -> Self {
        let entries: Vec<HierarchyEntry> = self
            .entries
            .iter()
            .filter(|e| e.level == ADMIN2_LEVEL)
            .cloned()
            .collect();
        // Subsetting cannot introduce duplicates.
        match Self::from_entries(entries) {
            Ok(h) => h,
            Err(_) => unreachable!("subset of a validated hierarchy"),
        }
    }
}

/// Mapping of retired location ids onto their replacements. Values of a
/// retired id are summed into the replacement if it already exists in a
/// dataset, otherwise the id is relabelled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImputePair {
    pub from: i64,
    pub into: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImputeMap {
    pairs: Vec<ImputePair>,
}

impl Default for ImputeMap {
    fn default() -> Self {
        // Splits in the 2023 LSAE release, all folded into 44858.
        Self {
            pairs: vec![
                ImputePair {
                    from: 60908,
                    into: 44858,
                },
                ImputePair {
                    from: 95069,
                    into: 44858,
                },
                ImputePair {
                    from: 94364,
                    into: 44858,
                },
            ],
        }
    }
}

impl ImputeMap {
    pub fn new(pairs: Vec<ImputePair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[ImputePair] {
        &self.pairs
    }

    pub fn apply(&self, dataset: &mut BurdenDataset) -> Result<(), DatasetError> {
        for pair in &self.pairs {
            dataset.fold_location(pair.from, pair.into)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(location_id: i64, parent_id: i64, level: u8) -> HierarchyEntry {
        HierarchyEntry {
            location_id,
            parent_id,
            level,
            location_name: None,
        }
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = LocationHierarchy::from_entries(vec![entry(1, 0, 3), entry(1, 0, 5)]);
        assert!(matches!(err, Err(HierarchyError::DuplicateLocation(1))));
    }

    #[test]
    fn admin2_subset_filters_levels() {
        let hierarchy = LocationHierarchy::from_entries(vec![
            entry(100, 1, 4),
            entry(200, 100, 5),
            entry(201, 100, 5),
        ])
        .unwrap();

        let admin2 = hierarchy.admin2_subset();
        assert_eq!(admin2.len(), 2);
        assert_eq!(admin2.parent_of(200), Some(100));
        assert!(!admin2.contains(100));
    }

    #[test]
    fn default_impute_map_folds() {
        let mut ds = BurdenDataset::new(
            vec![44858, 60908],
            vec![22],
            vec![3],
            vec![2030],
            vec![2.0, 5.0],
        )
        .unwrap();

        ImputeMap::default().apply(&mut ds).unwrap();
        assert_eq!(ds.locations(), &[44858]);
        assert_eq!(ds.value_at(44858, 22, 3, 2030).unwrap(), 7.0);
    }

    #[test]
    fn impute_relabels_when_target_absent() {
        let mut ds =
            BurdenDataset::new(vec![94364], vec![22], vec![3], vec![2030], vec![4.0]).unwrap();

        ImputeMap::default().apply(&mut ds).unwrap();
        assert_eq!(ds.locations(), &[44858]);
    }
}
