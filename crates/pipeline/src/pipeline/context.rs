use anyhow::{Context, Result};
use std::path::PathBuf;
use vbdrake_core::config::RakeConfig;
use vbdrake_core::dataset::BurdenDataset;
use vbdrake_core::domain::RakingJob;
use vbdrake_core::hierarchy::LocationHierarchy;

/// Mutable state threaded through the raking phases. Each phase fills the
/// slots later phases read.
#[derive(Debug, Clone)]
pub struct RakingContext {
    pub config: RakeConfig,
    pub job: RakingJob,
    /// Admin-2 subset of the location hierarchy.
    pub hierarchy: Option<LocationHierarchy>,
    /// Admin-1 forecast for this job's draw.
    pub forecast: Option<BurdenDataset>,
    /// Admin-2 predictions after imputation.
    pub predicted: Option<BurdenDataset>,
    pub admin2_with_parent: Option<BurdenDataset>,
    pub admin2_without_parent: Option<BurdenDataset>,
    /// Forecast restricted to the parents actually being raked to.
    pub admin1_targets: Option<BurdenDataset>,
    pub factors: Option<BurdenDataset>,
    pub raked: Option<BurdenDataset>,
    pub merged: Option<BurdenDataset>,
    pub output_path: Option<PathBuf>,
}

impl RakingContext {
    pub fn new(config: RakeConfig, job: RakingJob) -> Self {
        Self {
            config,
            job,
            hierarchy: None,
            forecast: None,
            predicted: None,
            admin2_with_parent: None,
            admin2_without_parent: None,
            admin1_targets: None,
            factors: None,
            raked: None,
            merged: None,
            output_path: None,
        }
    }
}

/// Fetch a slot an earlier phase must have filled.
pub(crate) fn require<'a, T>(slot: &'a Option<T>, what: &str) -> Result<&'a T> {
    slot.as_ref()
        .with_context(|| format!("{} not available in pipeline context", what))
}
