//! Job planning: grid expansion and completed-output skipping

use vbdrake_core::config::RakeConfig;
use vbdrake_core::domain::{JobGrid, RakingJob};
use vbdrake_core::storage;

/// The jobs a run will execute, with already-finished work set aside.
#[derive(Debug, Clone)]
pub struct JobPlan {
    pub pending: Vec<RakingJob>,
    pub already_done: Vec<RakingJob>,
}

impl JobPlan {
    /// Expand the grid and skip jobs whose output file already exists,
    /// unless `force` re-queues them.
    pub fn new(grid: &JobGrid, config: &RakeConfig, force: bool) -> Self {
        let mut pending = Vec::new();
        let mut already_done = Vec::new();

        for job in grid.expand() {
            if !force && storage::output_exists(config, &job) {
                already_done.push(job);
            } else {
                pending.push(job);
            }
        }

        Self {
            pending,
            already_done,
        }
    }

    pub fn total(&self) -> usize {
        self.pending.len() + self.already_done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
