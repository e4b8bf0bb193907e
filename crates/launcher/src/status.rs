//! Output completeness reporting

use serde::{Deserialize, Serialize};
use vbdrake_core::config::RakeConfig;
use vbdrake_core::domain::{Cause, Draw, JobGrid, Measure, RakingJob, Scenario};
use vbdrake_core::error::StorageError;
use vbdrake_core::storage;

/// Done/missing counts for one output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStatus {
    pub cause: Cause,
    pub scenario: Scenario,
    pub measure: Measure,
    pub done: usize,
    pub missing: usize,
}

impl GroupStatus {
    pub fn complete(&self) -> bool {
        self.missing == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub groups: Vec<GroupStatus>,
}

impl StatusReport {
    /// Scan each expected output directory once and compare the draw files
    /// found there against the grid.
    pub fn collect(grid: &JobGrid, config: &RakeConfig) -> Result<Self, StorageError> {
        let jobs = grid.expand();

        let mut keys: Vec<(Cause, Scenario, Measure)> = Vec::new();
        for job in &jobs {
            let key = (job.cause, job.scenario, job.measure);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let mut groups = Vec::with_capacity(keys.len());
        for (cause, scenario, measure) in keys {
            let expected: Vec<Draw> = jobs
                .iter()
                .filter(|j| j.cause == cause && j.scenario == scenario && j.measure == measure)
                .map(|j| j.draw)
                .collect();

            let dir = config
                .output_root
                .join(storage::raked_dir_name(cause, scenario, measure));
            let present = storage::existing_draws(&dir)?;

            let done = expected
                .iter()
                .filter(|d| present.contains(&d.value()))
                .count();
            groups.push(GroupStatus {
                cause,
                scenario,
                measure,
                done,
                missing: expected.len() - done,
            });
        }

        Ok(Self { groups })
    }

    pub fn done(&self) -> usize {
        self.groups.iter().map(|g| g.done).sum()
    }

    pub fn missing(&self) -> usize {
        self.groups.iter().map(|g| g.missing).sum()
    }

    /// Jobs whose outputs are absent, for re-queueing.
    pub fn missing_jobs(grid: &JobGrid, config: &RakeConfig) -> Vec<RakingJob> {
        grid.expand()
            .into_iter()
            .filter(|job| !storage::output_exists(config, job))
            .collect()
    }
}
