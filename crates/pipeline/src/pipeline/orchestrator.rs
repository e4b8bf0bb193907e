use super::context::{require, RakingContext};
use super::phase_trait::WorkflowPhase;
use super::phases::{
    align::AlignPhase, apply::ApplyPhase, factor::FactorPhase, load::LoadPhase, merge::MergePhase,
    save::SavePhase, split::SplitPhase,
};
use crate::summary::RakingSummary;
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;
use vbdrake_core::rake;

pub struct PipelineOrchestrator;

impl Default for PipelineOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineOrchestrator {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, context: &mut RakingContext) -> Result<RakingSummary> {
        let start = Instant::now();
        info!(job = %context.job, "Starting raking pipeline");

        let workflow_phases: Vec<Box<dyn WorkflowPhase>> = vec![
            Box::new(LoadPhase),
            Box::new(AlignPhase),
            Box::new(SplitPhase),
            Box::new(FactorPhase),
            Box::new(ApplyPhase),
            Box::new(MergePhase),
            Box::new(SavePhase),
        ];

        for phase in workflow_phases {
            let phase_name = phase.name();
            info!(phase = %phase_name, job = %context.job, "Starting phase");

            let phase_start = Instant::now();
            phase
                .execute(context)
                .await
                .with_context(|| format!("Phase {} failed for {}", phase_name, context.job))?;

            info!(
                phase = %phase_name,
                duration_ms = phase_start.elapsed().as_millis(),
                "Phase complete"
            );
        }

        let summary = summarize(context, start)?;
        info!(
            job = %context.job,
            locations = summary.raked_locations + summary.passthrough_locations,
            total_time_ms = summary.duration_ms,
            "Raking complete"
        );
        Ok(summary)
    }
}

fn summarize(context: &RakingContext, start: Instant) -> Result<RakingSummary> {
    let rakeable = require(&context.admin2_with_parent, "rakeable admin-2 dataset")?;
    let passthrough = require(&context.admin2_without_parent, "passthrough dataset")?;
    let targets = require(&context.admin1_targets, "admin-1 targets")?;
    let factors = require(&context.factors, "raking factors")?;
    let merged = require(&context.merged, "merged dataset")?;
    let output_path = require(&context.output_path, "output path")?;

    let range = rake::factor_range(factors);
    Ok(RakingSummary {
        job: context.job,
        raked_locations: rakeable.locations().len(),
        passthrough_locations: passthrough.locations().len(),
        parents: targets.locations().len(),
        factor_min: range.map(|(min, _)| min),
        factor_max: range.map(|(_, max)| max),
        total_burden: merged.total(),
        output_path: output_path.clone(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}
