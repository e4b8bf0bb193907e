//! Shared fixtures: a tiny two-parent world with one passthrough child

// Not every test binary touches every fixture constant.
#![allow(dead_code)]

use std::path::Path;
use vbdrake_core::config::RakeConfig;
use vbdrake_core::dataset::BurdenDataset;
use vbdrake_core::domain::{Cause, Draw, Measure, RakingJob, Scenario};
use vbdrake_core::hierarchy::{HierarchyEntry, LocationHierarchy};
use vbdrake_core::storage::{self, DrawBundle};

pub const PARENT_A: i64 = 101;
pub const PARENT_B: i64 = 102;
/// Child of a parent the forecast does not cover.
pub const ORPHAN_CHILD: i64 = 204;
/// Replacement id the default impute map folds retired ids into.
pub const IMPUTED_CHILD: i64 = 44858;
/// Retired id present in raw predictions only.
pub const RETIRED_CHILD: i64 = 60908;

pub const AGES: [i64; 2] = [22, 23];
pub const SEXES: [i64; 2] = [1, 2];
pub const YEARS: [i64; 2] = [2030, 2031];

pub fn test_job() -> RakingJob {
    RakingJob {
        cause: Cause::Malaria,
        scenario: Scenario::Ssp245,
        measure: Measure::Death,
        draw: Draw::new(0).unwrap(),
    }
}

pub fn test_config(root: &Path) -> RakeConfig {
    RakeConfig {
        forecast_root: root.join("forecast"),
        predicted_root: root.join("input"),
        output_root: root.join("output"),
        hierarchy_path: root.join("hierarchy.json"),
        concurrency: 2,
        ..RakeConfig::default()
    }
}

fn constant(locations: Vec<i64>, ages: &[i64], value: f64) -> BurdenDataset {
    let cells = locations.len() * ages.len() * SEXES.len() * YEARS.len();
    BurdenDataset::new(
        locations,
        ages.to_vec(),
        SEXES.to_vec(),
        YEARS.to_vec(),
        vec![value; cells],
    )
    .unwrap()
}

/// Admin-1 forecast: parent A has double the admin-2 mass under it, parent
/// B forecasts zero. The extra age group 24 exercises the demographic
/// intersection, the second draw exercises draw selection.
fn forecast_bundle() -> DrawBundle {
    let forecast_ages = [22, 23, 24];
    let build = |parent_a_value: f64| {
        let locations = vec![PARENT_A, PARENT_B, 103];
        let cells_per_location = forecast_ages.len() * SEXES.len() * YEARS.len();
        let mut values = Vec::new();
        for &location in &locations {
            let value = match location {
                PARENT_A => parent_a_value,
                PARENT_B => 0.0,
                _ => 5.0,
            };
            values.extend(std::iter::repeat(value).take(cells_per_location));
        }
        BurdenDataset::new(
            locations,
            forecast_ages.to_vec(),
            SEXES.to_vec(),
            YEARS.to_vec(),
            values,
        )
        .unwrap()
    };

    DrawBundle::new(vec![(0, build(8.0)), (1, build(16.0))])
}

/// Raw admin-2 predictions: every cell 1.0. Includes the retired id that
/// imputation folds into `IMPUTED_CHILD`.
fn predicted_dataset() -> BurdenDataset {
    constant(
        vec![201, 202, IMPUTED_CHILD, RETIRED_CHILD, 203, ORPHAN_CHILD],
        &AGES,
        1.0,
    )
}

fn hierarchy() -> LocationHierarchy {
    let child = |location_id, parent_id| HierarchyEntry {
        location_id,
        parent_id,
        level: 5,
        location_name: None,
    };
    LocationHierarchy::from_entries(vec![
        HierarchyEntry {
            location_id: PARENT_A,
            parent_id: 1,
            level: 4,
            location_name: None,
        },
        child(201, PARENT_A),
        child(202, PARENT_A),
        child(IMPUTED_CHILD, PARENT_A),
        child(203, PARENT_B),
        child(ORPHAN_CHILD, 999),
    ])
    .unwrap()
}

/// Write forecast, predictions and hierarchy for `job` under the config's
/// roots.
pub fn write_world(config: &RakeConfig, job: &RakingJob) {
    let forecast_path = storage::forecast_path(config, job).unwrap();
    storage::write_forecast(&forecast_path, &forecast_bundle()).unwrap();

    let predicted_path = storage::predicted_path(config, job);
    storage::write_dataset(&predicted_path, &predicted_dataset()).unwrap();

    storage::write_hierarchy(&config.hierarchy_path, &hierarchy()).unwrap();
}
