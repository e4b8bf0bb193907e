//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{error, info};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted {
                total_jobs,
                skipped,
            } => {
                info!(total_jobs, skipped, "Starting raking run");
            }
            ProgressEvent::JobStarted { job } => {
                info!(job = %job, "Starting job");
            }
            ProgressEvent::JobCompleted {
                job,
                duration,
                raked_locations,
            } => {
                info!(
                    job = %job,
                    duration_ms = duration.as_millis(),
                    raked_locations,
                    "Job complete"
                );
            }
            ProgressEvent::JobFailed { job, error } => {
                error!(job = %job, error = %error, "Job failed");
            }
            ProgressEvent::RunCompleted {
                succeeded,
                failed,
                duration,
            } => {
                if *failed > 0 {
                    error!(
                        succeeded,
                        failed,
                        duration_ms = duration.as_millis(),
                        "Run complete with failures"
                    );
                } else {
                    info!(
                        succeeded,
                        duration_ms = duration.as_millis(),
                        "Run complete"
                    );
                }
            }
        }
    }
}
