//! Bounded worker pool over raking jobs
//!
//! The portable replacement for the cluster scheduler: jobs run as local
//! tokio tasks gated by a semaphore. A failing job never stops the rest of
//! the run; failures are collected into the manifest.

use crate::manifest::{JobFailure, RunManifest};
use crate::plan::JobPlan;
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use uuid::Uuid;
use vbdrake_core::config::RakeConfig;
use vbdrake_core::domain::RakingJob;
use vbdrake_core::progress::{ProgressEvent, ProgressHandler};
use vbdrake_pipeline::{PipelineOrchestrator, RakingContext, RakingSummary};

pub struct WorkflowRunner {
    concurrency: usize,
}

impl WorkflowRunner {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Execute every pending job in the plan and write nothing but the
    /// per-job outputs; the returned manifest is the caller's to persist.
    pub async fn run(
        &self,
        plan: JobPlan,
        config: &RakeConfig,
        handler: Arc<dyn ProgressHandler>,
    ) -> Result<RunManifest> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        handler.on_progress(&ProgressEvent::RunStarted {
            total_jobs: plan.total(),
            skipped: plan.already_done.len(),
        });
        debug!(
            run_id = %run_id,
            pending = plan.pending.len(),
            skipped = plan.already_done.len(),
            concurrency = self.concurrency,
            "Run planned"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<std::result::Result<RakingSummary, JobFailure>> = JoinSet::new();

        for job in plan.pending.iter().copied() {
            let semaphore = Arc::clone(&semaphore);
            let handler = Arc::clone(&handler);
            let config = config.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| failure(job, &anyhow::anyhow!(e)))?;

                handler.on_progress(&ProgressEvent::JobStarted { job });
                let job_start = Instant::now();

                let mut context = RakingContext::new(config, job);
                match PipelineOrchestrator::new().execute(&mut context).await {
                    Ok(summary) => {
                        handler.on_progress(&ProgressEvent::JobCompleted {
                            job,
                            duration: job_start.elapsed(),
                            raked_locations: summary.raked_locations,
                        });
                        Ok(summary)
                    }
                    Err(error) => {
                        handler.on_progress(&ProgressEvent::JobFailed {
                            job,
                            error: format!("{:#}", error),
                        });
                        Err(failure(job, &error))
                    }
                }
            });
        }

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined.context("Raking worker task panicked")? {
                Ok(summary) => succeeded.push(summary),
                Err(job_failure) => failed.push(job_failure),
            }
        }

        // JoinSet completion order is arbitrary; keep the manifest stable.
        succeeded.sort_by_key(|s| s.job.to_string());
        failed.sort_by_key(|f| f.job.to_string());

        if !failed.is_empty() {
            warn!(failed = failed.len(), "Run finished with failures");
        }
        handler.on_progress(&ProgressEvent::RunCompleted {
            succeeded: succeeded.len(),
            failed: failed.len(),
            duration: start.elapsed(),
        });

        Ok(RunManifest {
            run_id,
            started_at,
            finished_at: Utc::now(),
            succeeded,
            failed,
            skipped: plan.already_done,
        })
    }
}

fn failure(job: RakingJob, error: &anyhow::Error) -> JobFailure {
    JobFailure {
        job,
        error: format!("{:#}", error),
    }
}
