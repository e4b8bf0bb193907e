use crate::pipeline::context::RakingContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;
use vbdrake_core::storage;

/// Load the forecast draw, the admin-2 predictions and the hierarchy, and
/// fold retired location ids into their replacements.
pub struct LoadPhase;

#[async_trait]
impl WorkflowPhase for LoadPhase {
    fn name(&self) -> &'static str {
        "LoadPhase"
    }

    async fn execute(&self, context: &mut RakingContext) -> Result<()> {
        let job = context.job;

        let forecast_path = storage::forecast_path(&context.config, &job)?;
        let bundle = storage::read_forecast(&forecast_path)
            .with_context(|| format!("Loading forecast for {}", job))?;
        let forecast = bundle.select(job.draw)?.clone();

        let predicted_path = storage::predicted_path(&context.config, &job);
        let mut predicted = storage::read_dataset(&predicted_path)
            .with_context(|| format!("Loading admin-2 predictions for {}", job))?;
        context.config.impute.apply(&mut predicted)?;

        let hierarchy = storage::read_hierarchy(&context.config.hierarchy_path)
            .context("Loading location hierarchy")?
            .admin2_subset();

        debug!(
            forecast_locations = forecast.locations().len(),
            predicted_locations = predicted.locations().len(),
            admin2_entries = hierarchy.len(),
            "Inputs loaded"
        );

        context.forecast = Some(forecast);
        context.predicted = Some(predicted);
        context.hierarchy = Some(hierarchy);
        Ok(())
    }
}
