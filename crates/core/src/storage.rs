//! Path layout and dataset file IO
//!
//! Dataset files are gzip-compressed bincode. Forecast files bundle every
//! draw for a cause/scenario/measure; predicted and raked files hold one
//! draw each. The directory grammar matches the 2025-08 admin-2 deliverable
//! layout, with `_raked` appended on the output side.

use crate::config::{ConfigError, RakeConfig};
use crate::dataset::BurdenDataset;
use crate::domain::{Cause, Draw, Measure, RakingJob, Scenario};
use crate::error::{DatasetError, StorageError};
use crate::hierarchy::{HierarchyEntry, LocationHierarchy};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Admin-1 forecast with one dataset per draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawBundle {
    draws: Vec<u16>,
    datasets: Vec<BurdenDataset>,
}

impl DrawBundle {
    pub fn new(entries: Vec<(u16, BurdenDataset)>) -> Self {
        let (draws, datasets) = entries.into_iter().unzip();
        Self { draws, datasets }
    }

    pub fn draws(&self) -> &[u16] {
        &self.draws
    }

    pub fn select(&self, draw: Draw) -> Result<&BurdenDataset, DatasetError> {
        self.draws
            .iter()
            .position(|&d| d == draw.value())
            .map(|idx| &self.datasets[idx])
            .ok_or(DatasetError::DrawNotInBundle { draw: draw.value() })
    }
}

/// Directory holding the per-draw admin-2 predictions for a job.
pub fn predicted_dir_name(cause: Cause, scenario: Scenario, measure: Measure) -> String {
    dir_name(cause, scenario, measure.predicted_family(), false)
}

/// Directory holding the raked outputs for a job.
pub fn raked_dir_name(cause: Cause, scenario: Scenario, measure: Measure) -> String {
    dir_name(cause, scenario, measure.count_label(), true)
}

fn dir_name(cause: Cause, scenario: Scenario, measure_label: &str, raked: bool) -> String {
    let mut name = format!(
        "as_cause_{}_measure_{}_metric_count_ssp_scenario_{}",
        cause,
        measure_label,
        scenario.ssp_label()
    );
    if let Some(segment) = cause.dah_segment() {
        name.push('_');
        name.push_str(segment);
    }
    if raked {
        name.push_str("_raked");
    }
    name
}

pub fn draw_file_name(draw: Draw) -> String {
    format!("draw_{}.bin", draw.value())
}

/// Extract the draw id from a file name like `draw_17.bin`.
pub fn parse_draw_file_name(name: &str) -> Option<u16> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"draw_(\d+)").unwrap_or_else(|_| unreachable!("static pattern"))
    });
    pattern
        .captures(name)
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn forecast_path(config: &RakeConfig, job: &RakingJob) -> Result<PathBuf, ConfigError> {
    let version = config.forecast_version(job.scenario, job.measure)?;
    Ok(config
        .forecast_root
        .join(job.measure.as_str())
        .join(version)
        .join(job.cause.forecast_file_name()))
}

pub fn predicted_path(config: &RakeConfig, job: &RakingJob) -> PathBuf {
    config
        .predicted_root
        .join(predicted_dir_name(job.cause, job.scenario, job.measure))
        .join(draw_file_name(job.draw))
}

pub fn output_path(config: &RakeConfig, job: &RakingJob) -> PathBuf {
    config
        .output_root
        .join(raked_dir_name(job.cause, job.scenario, job.measure))
        .join(draw_file_name(job.draw))
}

pub fn output_exists(config: &RakeConfig, job: &RakingJob) -> bool {
    output_path(config, job).exists()
}

/// Draw ids present in a dataset directory, parsed from file names. A
/// missing directory is an empty set, not an error.
pub fn existing_draws(dir: &Path) -> Result<HashSet<u16>, StorageError> {
    if !dir.exists() {
        return Ok(HashSet::new());
    }

    let entries = fs::read_dir(dir).map_err(|source| StorageError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut draws = HashSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| StorageError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        if let Some(draw) = entry.file_name().to_str().and_then(parse_draw_file_name) {
            draws.insert(draw);
        }
    }
    Ok(draws)
}

pub fn read_dataset(path: &Path) -> Result<BurdenDataset, StorageError> {
    let reader = open(path)?;
    bincode::deserialize_from(GzDecoder::new(reader)).map_err(|source| StorageError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_forecast(path: &Path) -> Result<DrawBundle, StorageError> {
    let reader = open(path)?;
    bincode::deserialize_from(GzDecoder::new(reader)).map_err(|source| StorageError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_dataset(path: &Path, dataset: &BurdenDataset) -> Result<(), StorageError> {
    write_encoded(path, dataset)
}

pub fn write_forecast(path: &Path, bundle: &DrawBundle) -> Result<(), StorageError> {
    write_encoded(path, bundle)
}

fn write_encoded<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
        set_group_writable(parent)?;
    }

    let file = File::create(path).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::fast());
    bincode::serialize_into(&mut encoder, value).map_err(|source| StorageError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = encoder.finish().map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    writer.into_inner().map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source: source.into_error(),
    })?;

    set_group_writable(path)
}

/// Deliverable trees are shared between team members; outputs are chmodded
/// to 0o775 like the rest of the tree.
#[cfg(unix)]
fn set_group_writable(path: &Path) -> Result<(), StorageError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o775)).map_err(|source| {
        StorageError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn set_group_writable(_path: &Path) -> Result<(), StorageError> {
    Ok(())
}

pub fn read_hierarchy(path: &Path) -> Result<LocationHierarchy, StorageError> {
    let reader = open(path)?;
    let entries: Vec<HierarchyEntry> =
        serde_json::from_reader(reader).map_err(|source| StorageError::Hierarchy {
            path: path.to_path_buf(),
            source,
        })?;
    LocationHierarchy::from_entries(entries).map_err(|source| StorageError::InvalidHierarchy {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_hierarchy(path: &Path, hierarchy: &LocationHierarchy) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), hierarchy.entries()).map_err(|source| {
        StorageError::Hierarchy {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn open(path: &Path) -> Result<BufReader<File>, StorageError> {
    if !path.exists() {
        return Err(StorageError::Missing {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dataset() -> BurdenDataset {
        BurdenDataset::new(
            vec![201, 202],
            vec![22],
            vec![3],
            vec![2030],
            vec![1.5, 2.5],
        )
        .unwrap()
    }

    #[test]
    fn predicted_dir_uses_family_and_dah_segment() {
        assert_eq!(
            predicted_dir_name(Cause::Malaria, Scenario::Ssp245, Measure::Yll),
            "as_cause_malaria_measure_mortality_metric_count_ssp_scenario_ssp245_dah_scenario_Baseline"
        );
        assert_eq!(
            predicted_dir_name(Cause::Dengue, Scenario::Ssp585, Measure::Incidence),
            "as_cause_dengue_measure_incidence_metric_count_ssp_scenario_ssp585"
        );
    }

    #[test]
    fn raked_dir_uses_count_label() {
        assert_eq!(
            raked_dir_name(Cause::Malaria, Scenario::Ssp126, Measure::Death),
            "as_cause_malaria_measure_mortality_metric_count_ssp_scenario_ssp126_dah_scenario_Baseline_raked"
        );
        assert_eq!(
            raked_dir_name(Cause::Dengue, Scenario::Ssp245, Measure::Yll),
            "as_cause_dengue_measure_yll_metric_count_ssp_scenario_ssp245_raked"
        );
    }

    #[test]
    fn draw_file_names_round_trip() {
        let draw = Draw::new(17).unwrap();
        let name = draw_file_name(draw);
        assert_eq!(name, "draw_17.bin");
        assert_eq!(parse_draw_file_name(&name), Some(17));
        assert_eq!(parse_draw_file_name("hierarchy.json"), None);
    }

    #[test]
    fn dataset_files_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("draw_0.bin");

        let original = dataset();
        write_dataset(&path, &original).unwrap();
        let loaded = read_dataset(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn missing_input_is_a_typed_error() {
        let dir = TempDir::new().unwrap();
        let err = read_dataset(&dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, StorageError::Missing { .. }));
    }

    #[test]
    fn forecast_bundle_selects_draws() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("malaria.bin");

        let bundle = DrawBundle::new(vec![(0, dataset()), (7, dataset())]);
        write_forecast(&path, &bundle).unwrap();
        let loaded = read_forecast(&path).unwrap();

        assert!(loaded.select(Draw::new(7).unwrap()).is_ok());
        let err = loaded.select(Draw::new(9).unwrap()).unwrap_err();
        assert!(matches!(err, DatasetError::DrawNotInBundle { draw: 9 }));
    }

    #[test]
    fn existing_draws_scans_file_names() {
        let dir = TempDir::new().unwrap();
        assert!(existing_draws(&dir.path().join("absent")).unwrap().is_empty());

        let ds = dataset();
        write_dataset(&dir.path().join("draw_0.bin"), &ds).unwrap();
        write_dataset(&dir.path().join("draw_12.bin"), &ds).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let draws = existing_draws(dir.path()).unwrap();
        assert_eq!(draws, HashSet::from([0, 12]));
    }

    #[test]
    fn hierarchy_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hierarchy.json");

        let hierarchy = LocationHierarchy::from_entries(vec![HierarchyEntry {
            location_id: 201,
            parent_id: 101,
            level: 5,
            location_name: Some("Somewhere".to_string()),
        }])
        .unwrap();

        write_hierarchy(&path, &hierarchy).unwrap();
        let loaded = read_hierarchy(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.parent_of(201), Some(101));
    }

    #[test]
    fn job_paths_follow_layout() {
        let config = RakeConfig {
            forecast_root: PathBuf::from("/data/forecast"),
            predicted_root: PathBuf::from("/data/input"),
            output_root: PathBuf::from("/data/output"),
            ..RakeConfig::default()
        };
        let job = RakingJob {
            cause: Cause::Dengue,
            scenario: Scenario::Ssp245,
            measure: Measure::Death,
            draw: Draw::new(3).unwrap(),
        };

        let forecast = forecast_path(&config, &job).unwrap();
        assert!(forecast.starts_with("/data/forecast/death"));
        assert!(forecast.ends_with("ntd_dengue.bin"));

        assert_eq!(
            predicted_path(&config, &job),
            PathBuf::from(
                "/data/input/as_cause_dengue_measure_mortality_metric_count_ssp_scenario_ssp245/draw_3.bin"
            )
        );
        assert_eq!(
            output_path(&config, &job),
            PathBuf::from(
                "/data/output/as_cause_dengue_measure_mortality_metric_count_ssp_scenario_ssp245_raked/draw_3.bin"
            )
        );
        assert!(!output_exists(&config, &job));
    }
}
