//! Output formatting for the rake, launch and status commands

use anyhow::{Context, Result};
use clap::ValueEnum;
use vbdrake_launcher::{JobPlan, RunManifest, StatusReport};
use vbdrake_pipeline::RakingSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted text
    Human,
    /// JSON (machine-readable)
    Json,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_summary(&self, summary: &RakingSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(summary),
            OutputFormat::Human => Ok(format_summary_human(summary)),
        }
    }

    pub fn format_manifest(&self, manifest: &RunManifest) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(manifest),
            OutputFormat::Human => Ok(format_manifest_human(manifest)),
        }
    }

    pub fn format_status(&self, report: &StatusReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report),
            OutputFormat::Human => Ok(format_status_human(report)),
        }
    }

    pub fn format_plan(&self, plan: &JobPlan) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(&plan.pending),
            OutputFormat::Human => Ok(format_plan_human(plan)),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Serializing output to JSON")
}

fn format_summary_human(summary: &RakingSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Job:           {}\n", summary.job));
    out.push_str(&format!("Raked:         {} locations\n", summary.raked_locations));
    out.push_str(&format!(
        "Passthrough:   {} locations\n",
        summary.passthrough_locations
    ));
    out.push_str(&format!("Parents:       {}\n", summary.parents));
    if let (Some(min), Some(max)) = (summary.factor_min, summary.factor_max) {
        out.push_str(&format!("Factors:       {:.4} .. {:.4}\n", min, max));
    }
    out.push_str(&format!("Total burden:  {:.2}\n", summary.total_burden));
    out.push_str(&format!("Output:        {}\n", summary.output_path.display()));
    out.push_str(&format!("Duration:      {} ms\n", summary.duration_ms));
    out
}

fn format_manifest_human(manifest: &RunManifest) -> String {
    let mut out = String::new();
    out.push_str(&format!("Run {}\n", manifest.run_id));
    out.push_str(&format!(
        "Succeeded: {}  Failed: {}  Skipped: {}\n",
        manifest.succeeded.len(),
        manifest.failed.len(),
        manifest.skipped.len()
    ));
    for failure in &manifest.failed {
        out.push_str(&format!("  FAILED {}: {}\n", failure.job, failure.error));
    }
    out
}

fn format_status_human(report: &StatusReport) -> String {
    let mut out = String::new();
    for group in &report.groups {
        let mark = if group.complete() { "done" } else { "incomplete" };
        out.push_str(&format!(
            "{:<8} {:<7} {:<10} {:>4} done {:>4} missing  [{}]\n",
            group.cause.to_string(),
            group.scenario.to_string(),
            group.measure.to_string(),
            group.done,
            group.missing,
            mark
        ));
    }
    out.push_str(&format!(
        "Total: {} done, {} missing\n",
        report.done(),
        report.missing()
    ));
    out
}

fn format_plan_human(plan: &JobPlan) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} pending, {} already done\n",
        plan.pending.len(),
        plan.already_done.len()
    ));
    for job in &plan.pending {
        out.push_str(&format!("  {}\n", job));
    }
    out
}
