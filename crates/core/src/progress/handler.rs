//! Progress event definitions

use crate::domain::RakingJob;
use std::time::Duration;

/// Events emitted while a run executes. Handlers must be cheap; they are
/// called from worker tasks.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    RunStarted {
        total_jobs: usize,
        skipped: usize,
    },
    JobStarted {
        job: RakingJob,
    },
    JobCompleted {
        job: RakingJob,
        duration: Duration,
        raked_locations: usize,
    },
    JobFailed {
        job: RakingJob,
        error: String,
    },
    RunCompleted {
        succeeded: usize,
        failed: usize,
        duration: Duration,
    },
}

pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}
