//! Run manifest written after every launch

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use vbdrake_core::domain::RakingJob;
use vbdrake_pipeline::RakingSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFailure {
    pub job: RakingJob,
    pub error: String,
}

/// Record of one launch: what ran, what failed, what was skipped because
/// its output already existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub succeeded: Vec<RakingSummary>,
    pub failed: Vec<JobFailure>,
    pub skipped: Vec<RakingJob>,
}

impl RunManifest {
    pub fn file_name(&self) -> String {
        format!("run_{}.json", self.run_id)
    }

    /// Write the manifest as JSON into `dir` and return the file path.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Creating manifest directory {}", dir.display()))?;
        let path = dir.join(self.file_name());
        let file = File::create(&path)
            .with_context(|| format!("Creating manifest file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Writing manifest {}", path.display()))?;
        Ok(path)
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}
