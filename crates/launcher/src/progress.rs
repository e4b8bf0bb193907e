//! Terminal progress bar handler

use indicatif::{ProgressBar, ProgressStyle};
use vbdrake_core::progress::{ProgressEvent, ProgressHandler};

/// Progress bar for interactive runs. The logging handler stays the right
/// choice when stderr is not a terminal.
pub struct BarHandler {
    bar: ProgressBar,
}

impl BarHandler {
    pub fn new(total_jobs: usize) -> Self {
        let bar = ProgressBar::new(total_jobs as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl ProgressHandler for BarHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { skipped, .. } => {
                if *skipped > 0 {
                    self.bar.println(format!("{} jobs already done", skipped));
                }
            }
            ProgressEvent::JobStarted { job } => {
                self.bar.set_message(job.to_string());
            }
            ProgressEvent::JobCompleted { .. } => {
                self.bar.inc(1);
            }
            ProgressEvent::JobFailed { job, error } => {
                self.bar.println(format!("FAILED {}: {}", job, error));
                self.bar.inc(1);
            }
            ProgressEvent::RunCompleted {
                succeeded, failed, ..
            } => {
                self.bar
                    .finish_with_message(format!("{} succeeded, {} failed", succeeded, failed));
            }
        }
    }
}
