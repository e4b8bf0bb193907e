use crate::domain::{Measure, Scenario};
use crate::hierarchy::{ImputeMap, ImputePair};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_FORECAST_ROOT: &str = "/mnt/share/forecasting/data/9/future";
const DEFAULT_PREDICTED_ROOT: &str =
    "/mnt/team/rapidresponse/pub/malaria-denv/deliverables/2025_08_26_admin_2_counts/input";
const DEFAULT_OUTPUT_ROOT: &str =
    "/mnt/team/rapidresponse/pub/malaria-denv/deliverables/2025_08_26_admin_2_counts/output";
const DEFAULT_HIERARCHY_PATH: &str = "/mnt/team/rapidresponse/pub/malaria-denv/deliverables/2025_08_26_admin_2_counts/full_hierarchy_2023_lsae_1209.json";
const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("No forecast version configured for scenario {scenario}, measure {measure}")]
    MissingForecastVersion { scenario: Scenario, measure: Measure },
}

/// Upstream forecast release used for one scenario/measure pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForecastVersion {
    pub scenario: Scenario,
    pub measure: Measure,
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct RakeConfig {
    pub forecast_root: PathBuf,
    pub predicted_root: PathBuf,
    pub output_root: PathBuf,
    pub hierarchy_path: PathBuf,
    pub concurrency: usize,
    pub forecast_versions: Vec<ForecastVersion>,
    pub impute: ImputeMap,
}

/// On-disk shape of the optional TOML config. Every field is optional;
/// anything absent keeps its default.
#[derive(Debug, Default, Deserialize)]
struct RakeConfigFile {
    forecast_root: Option<PathBuf>,
    predicted_root: Option<PathBuf>,
    output_root: Option<PathBuf>,
    hierarchy_path: Option<PathBuf>,
    concurrency: Option<usize>,
    forecast_versions: Option<Vec<ForecastVersion>>,
    impute: Option<Vec<ImputePair>>,
}

impl Default for RakeConfig {
    fn default() -> Self {
        Self {
            forecast_root: PathBuf::from(DEFAULT_FORECAST_ROOT),
            predicted_root: PathBuf::from(DEFAULT_PREDICTED_ROOT),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            hierarchy_path: PathBuf::from(DEFAULT_HIERARCHY_PATH),
            concurrency: DEFAULT_CONCURRENCY,
            forecast_versions: default_forecast_versions(),
            impute: ImputeMap::default(),
        }
    }
}

impl RakeConfig {
    /// Resolve configuration: built-in defaults, then the TOML file (the
    /// explicit path, or `VBDRAKE_CONFIG`), then `VBDRAKE_*` environment
    /// overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let file_path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var("VBDRAKE_CONFIG").ok().map(PathBuf::from));
        if let Some(path) = file_path {
            let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let file: RakeConfigFile =
                toml::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            config.merge(file);
        }

        config.apply_env();
        Ok(config)
    }

    fn merge(&mut self, file: RakeConfigFile) {
        if let Some(root) = file.forecast_root {
            self.forecast_root = root;
        }
        if let Some(root) = file.predicted_root {
            self.predicted_root = root;
        }
        if let Some(root) = file.output_root {
            self.output_root = root;
        }
        if let Some(path) = file.hierarchy_path {
            self.hierarchy_path = path;
        }
        if let Some(concurrency) = file.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(versions) = file.forecast_versions {
            // File entries override defaults pair-wise, they do not replace
            // the whole table.
            for version in versions {
                match self
                    .forecast_versions
                    .iter_mut()
                    .find(|v| v.scenario == version.scenario && v.measure == version.measure)
                {
                    Some(existing) => existing.version = version.version,
                    None => self.forecast_versions.push(version),
                }
            }
        }
        if let Some(pairs) = file.impute {
            self.impute = ImputeMap::new(pairs);
        }
    }

    fn apply_env(&mut self) {
        if let Ok(root) = env::var("VBDRAKE_FORECAST_ROOT") {
            self.forecast_root = PathBuf::from(root);
        }
        if let Ok(root) = env::var("VBDRAKE_PREDICTED_ROOT") {
            self.predicted_root = PathBuf::from(root);
        }
        if let Ok(root) = env::var("VBDRAKE_OUTPUT_ROOT") {
            self.output_root = PathBuf::from(root);
        }
        if let Ok(path) = env::var("VBDRAKE_HIERARCHY") {
            self.hierarchy_path = PathBuf::from(path);
        }
        if let Ok(concurrency) = env::var("VBDRAKE_JOBS") {
            if let Ok(parsed) = concurrency.parse::<usize>() {
                self.concurrency = parsed;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ValidationFailed(
                "Concurrency must be at least 1".to_string(),
            ));
        }

        for scenario in Scenario::ALL {
            for measure in Measure::ALL {
                if self.forecast_version(scenario, measure).is_err() {
                    return Err(ConfigError::MissingForecastVersion { scenario, measure });
                }
            }
        }

        Ok(())
    }

    pub fn forecast_version(
        &self,
        scenario: Scenario,
        measure: Measure,
    ) -> Result<&str, ConfigError> {
        self.forecast_versions
            .iter()
            .find(|v| v.scenario == scenario && v.measure == measure)
            .map(|v| v.version.as_str())
            .ok_or(ConfigError::MissingForecastVersion { scenario, measure })
    }
}

/// Forecast releases the 2025-08 deliverable rakes against.
fn default_forecast_versions() -> Vec<ForecastVersion> {
    let entry = |scenario, measure, version: &str| ForecastVersion {
        scenario,
        measure,
        version: version.to_string(),
    };

    vec![
        entry(
            Scenario::Ssp245,
            Measure::Death,
            "20250709_first_sub_rcp45_climate_ref_100d_hiv_shocks_covid_all_s8_num",
        ),
        entry(
            Scenario::Ssp245,
            Measure::Incidence,
            "20250719_rcp45_first_sub_climate_ref_scen0_agg_num",
        ),
        entry(
            Scenario::Ssp245,
            Measure::Yll,
            "20250709_rcp45_first_sub_climate_ref_agg_num_restored_draws",
        ),
        entry(
            Scenario::Ssp245,
            Measure::Yld,
            "20250719_rcp45_first_sub_climate_ref_scen0_agg_num",
        ),
        entry(
            Scenario::Ssp126,
            Measure::Death,
            "20250709_first_sub_rcp26_first_sub_climate_vector_borne_diseases_100d_hiv_shocks_covid_all_s8_num",
        ),
        entry(
            Scenario::Ssp126,
            Measure::Incidence,
            "20250719_rcp26_first_sub_climate_vector_borne_diseases_scen75_agg_num",
        ),
        entry(
            Scenario::Ssp126,
            Measure::Yll,
            "20250709_rcp26_first_sub_climate_vector_borne_diseases_agg_num_restored_draws",
        ),
        entry(
            Scenario::Ssp126,
            Measure::Yld,
            "20250719_rcp26_first_sub_climate_vector_borne_diseases_scen75_agg_num",
        ),
        entry(
            Scenario::Ssp585,
            Measure::Death,
            "20250709_first_sub_rcp85_first_sub_climate_vector_borne_diseases_100d_hiv_shocks_covid_all_s8_num",
        ),
        entry(
            Scenario::Ssp585,
            Measure::Incidence,
            "20250719_rcp85_first_sub_climate_vector_borne_diseases_scen76_agg_num",
        ),
        entry(
            Scenario::Ssp585,
            Measure::Yll,
            "20250709_rcp85_first_sub_climate_vector_borne_diseases_agg_num_restored_draws",
        ),
        entry(
            Scenario::Ssp585,
            Measure::Yld,
            "20250719_rcp85_first_sub_climate_vector_borne_diseases_scen76_agg_num",
        ),
    ]
}
