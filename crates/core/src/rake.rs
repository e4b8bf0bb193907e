//! Raking arithmetic
//!
//! Raking scales each admin-2 cell so that, per (age, sex, year) cell, the
//! admin-2 values under one parent sum to the parent's admin-1 forecast
//! value. Cells where either side of the ratio is zero are left alone
//! (factor 1.0), which keeps zero-burden cells zero instead of producing
//! infinities.

use crate::dataset::BurdenDataset;
use crate::error::DatasetError;
use crate::hierarchy::LocationHierarchy;

/// Sum admin-2 location blocks into their parents, aligned to the given
/// parent axis. Parents with no children keep zero sums.
pub fn sum_to_parents(
    admin2: &BurdenDataset,
    hierarchy: &LocationHierarchy,
    parent_ids: &[i64],
) -> Result<BurdenDataset, DatasetError> {
    let mut sums = BurdenDataset::zeros(
        parent_ids.to_vec(),
        admin2.ages().to_vec(),
        admin2.sexes().to_vec(),
        admin2.years().to_vec(),
    );
    let stride = sums.cells_per_location();

    for &child in admin2.locations() {
        let parent = hierarchy
            .parent_of(child)
            .ok_or(DatasetError::UnknownLocation(child))?;
        let parent_idx =
            sums.location_index(parent)
                .ok_or_else(|| DatasetError::UnknownCoordinate {
                    axis: "parent_id".to_string(),
                    id: parent,
                })?;

        let block = admin2
            .location_block(child)
            .ok_or(DatasetError::UnknownLocation(child))?
            .to_vec();
        let base = parent_idx * stride;
        let values = sums.values_mut();
        for (offset, value) in block.iter().enumerate() {
            values[base + offset] += value;
        }
    }

    Ok(sums)
}

/// Per-parent scaling factors. Both datasets must share all four axes;
/// `child_sums` is expected to come from [`sum_to_parents`] aligned to
/// `admin1`'s location axis.
pub fn raking_factors(
    admin1: &BurdenDataset,
    child_sums: &BurdenDataset,
) -> Result<BurdenDataset, DatasetError> {
    if admin1.locations() != child_sums.locations() || !admin1.same_demographics(child_sums) {
        return Err(DatasetError::AxisMismatch {
            context: "raking_factors".to_string(),
        });
    }

    let values: Vec<f64> = admin1
        .values()
        .iter()
        .zip(child_sums.values())
        .map(|(&target, &sum)| {
            if target == 0.0 || sum == 0.0 {
                1.0
            } else {
                target / sum
            }
        })
        .collect();

    BurdenDataset::new(
        admin1.locations().to_vec(),
        admin1.ages().to_vec(),
        admin1.sexes().to_vec(),
        admin1.years().to_vec(),
        values,
    )
}

/// Multiply each admin-2 cell by its parent's factor for the same
/// (age, sex, year) cell.
pub fn apply_factors(
    admin2: &BurdenDataset,
    factors: &BurdenDataset,
    hierarchy: &LocationHierarchy,
) -> Result<BurdenDataset, DatasetError> {
    if !admin2.same_demographics(factors) {
        return Err(DatasetError::AxisMismatch {
            context: "apply_factors".to_string(),
        });
    }

    let stride = admin2.cells_per_location();
    let mut values = Vec::with_capacity(admin2.values().len());
    for &child in admin2.locations() {
        let parent = hierarchy
            .parent_of(child)
            .ok_or(DatasetError::UnknownLocation(child))?;
        let factor_block =
            factors
                .location_block(parent)
                .ok_or_else(|| DatasetError::UnknownCoordinate {
                    axis: "parent_id".to_string(),
                    id: parent,
                })?;
        let child_block = admin2
            .location_block(child)
            .ok_or(DatasetError::UnknownLocation(child))?;

        debug_assert_eq!(factor_block.len(), stride);
        values.extend(
            child_block
                .iter()
                .zip(factor_block)
                .map(|(&value, &factor)| value * factor),
        );
    }

    BurdenDataset::new(
        admin2.locations().to_vec(),
        admin2.ages().to_vec(),
        admin2.sexes().to_vec(),
        admin2.years().to_vec(),
        values,
    )
}

/// Smallest and largest factor applied, ignoring the identity cells of
/// parents that had nothing to rake.
pub fn factor_range(factors: &BurdenDataset) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for &value in factors.values() {
        range = Some(match range {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        });
    }
    range
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{HierarchyEntry, LocationHierarchy};

    fn hierarchy() -> LocationHierarchy {
        let entries = vec![
            HierarchyEntry {
                location_id: 201,
                parent_id: 101,
                level: 5,
                location_name: None,
            },
            HierarchyEntry {
                location_id: 202,
                parent_id: 101,
                level: 5,
                location_name: None,
            },
            HierarchyEntry {
                location_id: 203,
                parent_id: 102,
                level: 5,
                location_name: None,
            },
        ];
        LocationHierarchy::from_entries(entries).unwrap()
    }

    fn admin2() -> BurdenDataset {
        // 3 children x 1 age x 1 sex x 2 years
        BurdenDataset::new(
            vec![201, 202, 203],
            vec![22],
            vec![3],
            vec![2030, 2031],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn sums_align_to_parent_axis() {
        let sums = sum_to_parents(&admin2(), &hierarchy(), &[101, 102]).unwrap();
        assert_eq!(sums.value_at(101, 22, 3, 2030).unwrap(), 4.0);
        assert_eq!(sums.value_at(101, 22, 3, 2031).unwrap(), 6.0);
        assert_eq!(sums.value_at(102, 22, 3, 2030).unwrap(), 5.0);
        assert_eq!(sums.value_at(102, 22, 3, 2031).unwrap(), 0.0);
    }

    #[test]
    fn childless_parent_keeps_zero_sum() {
        let sums = sum_to_parents(&admin2(), &hierarchy(), &[101, 102, 103]).unwrap();
        assert_eq!(sums.value_at(103, 22, 3, 2030).unwrap(), 0.0);
    }

    #[test]
    fn factors_divide_and_guard_zeros() {
        let admin1 = BurdenDataset::new(
            vec![101, 102],
            vec![22],
            vec![3],
            vec![2030, 2031],
            vec![8.0, 3.0, 10.0, 7.0],
        )
        .unwrap();
        let sums = sum_to_parents(&admin2(), &hierarchy(), &[101, 102]).unwrap();
        let factors = raking_factors(&admin1, &sums).unwrap();

        assert_eq!(factors.value_at(101, 22, 3, 2030).unwrap(), 2.0);
        assert_eq!(factors.value_at(101, 22, 3, 2031).unwrap(), 0.5);
        assert_eq!(factors.value_at(102, 22, 3, 2030).unwrap(), 2.0);
        // Child sum is zero for 102/2031: identity factor.
        assert_eq!(factors.value_at(102, 22, 3, 2031).unwrap(), 1.0);
    }

    #[test]
    fn zero_target_keeps_identity_factor() {
        let admin1 =
            BurdenDataset::new(vec![101], vec![22], vec![3], vec![2030], vec![0.0]).unwrap();
        let sums = BurdenDataset::new(vec![101], vec![22], vec![3], vec![2030], vec![4.0]).unwrap();
        let factors = raking_factors(&admin1, &sums).unwrap();
        assert_eq!(factors.value_at(101, 22, 3, 2030).unwrap(), 1.0);
    }

    #[test]
    fn apply_scales_children_to_parent_totals() {
        let admin1 = BurdenDataset::new(
            vec![101, 102],
            vec![22],
            vec![3],
            vec![2030, 2031],
            vec![8.0, 3.0, 10.0, 7.0],
        )
        .unwrap();
        let ds = admin2();
        let sums = sum_to_parents(&ds, &hierarchy(), &[101, 102]).unwrap();
        let factors = raking_factors(&admin1, &sums).unwrap();
        let raked = apply_factors(&ds, &factors, &hierarchy()).unwrap();

        // Children of 101 now sum to the forecast.
        let raked_sum_2030 = raked.value_at(201, 22, 3, 2030).unwrap()
            + raked.value_at(202, 22, 3, 2030).unwrap();
        assert_eq!(raked_sum_2030, 8.0);

        // Proportions preserved within the parent.
        assert_eq!(raked.value_at(201, 22, 3, 2030).unwrap(), 2.0);
        assert_eq!(raked.value_at(202, 22, 3, 2030).unwrap(), 6.0);

        // Zero cells stay zero even when the parent had a target.
        assert_eq!(raked.value_at(203, 22, 3, 2031).unwrap(), 0.0);
    }

    #[test]
    fn axis_mismatch_is_rejected() {
        let admin1 =
            BurdenDataset::new(vec![101], vec![22], vec![3], vec![2030], vec![1.0]).unwrap();
        let sums = BurdenDataset::new(vec![101], vec![23], vec![3], vec![2030], vec![1.0]).unwrap();
        assert!(matches!(
            raking_factors(&admin1, &sums),
            Err(DatasetError::AxisMismatch { .. })
        ));
    }

    #[test]
    fn factor_range_spans_values() {
        let factors = BurdenDataset::new(
            vec![101],
            vec![22],
            vec![3],
            vec![2030, 2031],
            vec![0.5, 2.5],
        )
        .unwrap();
        assert_eq!(factor_range(&factors), Some((0.5, 2.5)));
    }
}
