//! Per-job result record

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vbdrake_core::domain::RakingJob;

/// What one raking job produced. Reported by the CLI and collected into the
/// run manifest by the launcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RakingSummary {
    pub job: RakingJob,
    pub raked_locations: usize,
    pub passthrough_locations: usize,
    pub parents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_max: Option<f64>,
    pub total_burden: f64,
    pub output_path: PathBuf,
    pub duration_ms: u64,
}
