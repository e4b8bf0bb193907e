//! Dense burden arrays over (location, age, sex, year)
//!
//! Datasets are stored location-major: the values for one location form a
//! contiguous block of `ages * sexes * years` cells. Splitting, folding and
//! concatenating locations are therefore block copies, which is where all
//! the hot paths in raking live.

use crate::error::DatasetError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BurdenDataset {
    locations: Vec<i64>,
    ages: Vec<i64>,
    sexes: Vec<i64>,
    years: Vec<i64>,
    values: Vec<f64>,
}

impl BurdenDataset {
    pub fn new(
        locations: Vec<i64>,
        ages: Vec<i64>,
        sexes: Vec<i64>,
        years: Vec<i64>,
        values: Vec<f64>,
    ) -> Result<Self, DatasetError> {
        for (axis, ids) in [
            ("location_id", &locations),
            ("age_group_id", &ages),
            ("sex_id", &sexes),
            ("year_id", &years),
        ] {
            let unique: HashSet<_> = ids.iter().collect();
            if unique.len() != ids.len() {
                return Err(DatasetError::DuplicateCoordinate {
                    axis: axis.to_string(),
                });
            }
        }

        let expected = locations.len() * ages.len() * sexes.len() * years.len();
        if values.len() != expected {
            return Err(DatasetError::ShapeMismatch {
                expected,
                actual: values.len(),
            });
        }

        Ok(Self {
            locations,
            ages,
            sexes,
            years,
            values,
        })
    }

    /// All-zero dataset over the given axes.
    pub fn zeros(locations: Vec<i64>, ages: Vec<i64>, sexes: Vec<i64>, years: Vec<i64>) -> Self {
        let len = locations.len() * ages.len() * sexes.len() * years.len();
        Self {
            locations,
            ages,
            sexes,
            years,
            values: vec![0.0; len],
        }
    }

    pub fn locations(&self) -> &[i64] {
        &self.locations
    }

    pub fn ages(&self) -> &[i64] {
        &self.ages
    }

    pub fn sexes(&self) -> &[i64] {
        &self.sexes
    }

    pub fn years(&self) -> &[i64] {
        &self.years
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Cells per location block.
    pub fn cells_per_location(&self) -> usize {
        self.ages.len() * self.sexes.len() * self.years.len()
    }

    pub fn location_index(&self, location_id: i64) -> Option<usize> {
        self.locations.iter().position(|&id| id == location_id)
    }

    /// Value block for one location, in (age, sex, year) order.
    pub fn location_block(&self, location_id: i64) -> Option<&[f64]> {
        let idx = self.location_index(location_id)?;
        let stride = self.cells_per_location();
        Some(&self.values[idx * stride..(idx + 1) * stride])
    }

    pub fn value_at(
        &self,
        location_id: i64,
        age: i64,
        sex: i64,
        year: i64,
    ) -> Result<f64, DatasetError> {
        let l = self
            .location_index(location_id)
            .ok_or(DatasetError::UnknownLocation(location_id))?;
        let a = self
            .ages
            .iter()
            .position(|&id| id == age)
            .ok_or(DatasetError::UnknownCoordinate {
                axis: "age_group_id".to_string(),
                id: age,
            })?;
        let s = self
            .sexes
            .iter()
            .position(|&id| id == sex)
            .ok_or(DatasetError::UnknownCoordinate {
                axis: "sex_id".to_string(),
                id: sex,
            })?;
        let y = self
            .years
            .iter()
            .position(|&id| id == year)
            .ok_or(DatasetError::UnknownCoordinate {
                axis: "year_id".to_string(),
                id: year,
            })?;

        let idx = ((l * self.ages.len() + a) * self.sexes.len() + s) * self.years.len() + y;
        Ok(self.values[idx])
    }

    /// Subset to the given location ids, in the given order. Unknown ids
    /// are an error.
    pub fn select_locations(&self, location_ids: &[i64]) -> Result<Self, DatasetError> {
        let stride = self.cells_per_location();
        let mut values = Vec::with_capacity(location_ids.len() * stride);
        for &id in location_ids {
            let block = self
                .location_block(id)
                .ok_or(DatasetError::UnknownLocation(id))?;
            values.extend_from_slice(block);
        }
        Self::new(
            location_ids.to_vec(),
            self.ages.clone(),
            self.sexes.clone(),
            self.years.clone(),
            values,
        )
    }

    /// Keep only locations present in `keep`, preserving current order.
    pub fn retain_locations(&self, keep: &HashSet<i64>) -> Self {
        let kept: Vec<i64> = self
            .locations
            .iter()
            .copied()
            .filter(|id| keep.contains(id))
            .collect();
        // Every kept id comes from self, so select cannot fail.
        match self.select_locations(&kept) {
            Ok(ds) => ds,
            Err(_) => unreachable!("retained ids are a subset of existing locations"),
        }
    }

    /// Subset self to the age and sex ids shared with `other`, in `other`'s
    /// ordering so the two line up cell-for-cell afterwards. Year axes are
    /// left untouched.
    pub fn demographic_intersection(&self, other: &Self) -> Self {
        let my_ages: HashSet<i64> = self.ages.iter().copied().collect();
        let my_sexes: HashSet<i64> = self.sexes.iter().copied().collect();

        let ages: Vec<i64> = other
            .ages
            .iter()
            .copied()
            .filter(|id| my_ages.contains(id))
            .collect();
        let sexes: Vec<i64> = other
            .sexes
            .iter()
            .copied()
            .filter(|id| my_sexes.contains(id))
            .collect();

        self.subset_demographics(&ages, &sexes)
    }

    fn subset_demographics(&self, ages: &[i64], sexes: &[i64]) -> Self {
        let age_idx: Vec<usize> = ages
            .iter()
            .map(|id| {
                self.ages
                    .iter()
                    .position(|a| a == id)
                    .unwrap_or_else(|| unreachable!("age filtered from self"))
            })
            .collect();
        let sex_idx: Vec<usize> = sexes
            .iter()
            .map(|id| {
                self.sexes
                    .iter()
                    .position(|s| s == id)
                    .unwrap_or_else(|| unreachable!("sex filtered from self"))
            })
            .collect();

        let n_years = self.years.len();
        let mut values =
            Vec::with_capacity(self.locations.len() * ages.len() * sexes.len() * n_years);
        for l in 0..self.locations.len() {
            for &a in &age_idx {
                for &s in &sex_idx {
                    let base = ((l * self.ages.len() + a) * self.sexes.len() + s) * n_years;
                    values.extend_from_slice(&self.values[base..base + n_years]);
                }
            }
        }

        Self {
            locations: self.locations.clone(),
            ages: ages.to_vec(),
            sexes: sexes.to_vec(),
            years: self.years.clone(),
            values,
        }
    }

    /// Fold `from`'s values into `into` cell-wise and drop `from`. If `into`
    /// is not present, `from` is relabelled as `into` instead.
    pub fn fold_location(&mut self, from: i64, into: i64) -> Result<(), DatasetError> {
        let from_idx = match self.location_index(from) {
            Some(idx) => idx,
            // Nothing to fold.
            None => return Ok(()),
        };

        match self.location_index(into) {
            Some(into_idx) => {
                let stride = self.cells_per_location();
                let from_base = from_idx * stride;
                let into_base = into_idx * stride;
                for offset in 0..stride {
                    self.values[into_base + offset] += self.values[from_base + offset];
                }
                self.locations.remove(from_idx);
                self.values.drain(from_base..from_base + stride);
            }
            None => {
                if self.locations.contains(&into) {
                    return Err(DatasetError::DuplicateCoordinate {
                        axis: "location_id".to_string(),
                    });
                }
                self.locations[from_idx] = into;
            }
        }
        Ok(())
    }

    /// Append another dataset's locations. Demographic and year axes must
    /// match exactly and location sets must be disjoint.
    pub fn concat_locations(&self, other: &Self) -> Result<Self, DatasetError> {
        if self.ages != other.ages || self.sexes != other.sexes || self.years != other.years {
            return Err(DatasetError::AxisMismatch {
                context: "concat_locations".to_string(),
            });
        }
        let mine: HashSet<i64> = self.locations.iter().copied().collect();
        if other.locations.iter().any(|id| mine.contains(id)) {
            return Err(DatasetError::DuplicateCoordinate {
                axis: "location_id".to_string(),
            });
        }

        let mut locations = self.locations.clone();
        locations.extend_from_slice(&other.locations);
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);

        Self::new(
            locations,
            self.ages.clone(),
            self.sexes.clone(),
            self.years.clone(),
            values,
        )
    }

    pub fn same_demographics(&self, other: &Self) -> bool {
        self.ages == other.ages && self.sexes == other.sexes && self.years == other.years
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Per-location sums, keyed by location id.
    pub fn location_totals(&self) -> HashMap<i64, f64> {
        let stride = self.cells_per_location();
        self.locations
            .iter()
            .enumerate()
            .map(|(idx, &id)| {
                let total: f64 = self.values[idx * stride..(idx + 1) * stride].iter().sum();
                (id, total)
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}
