use crate::pipeline::context::{require, RakingContext};
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::{ensure, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

/// Subset the forecast to the age/sex ids the predictions carry, and drop
/// predicted locations the admin-2 hierarchy does not know about.
pub struct AlignPhase;

#[async_trait]
impl WorkflowPhase for AlignPhase {
    fn name(&self) -> &'static str {
        "AlignPhase"
    }

    async fn execute(&self, context: &mut RakingContext) -> Result<()> {
        let predicted = require(&context.predicted, "predicted dataset")?;
        let forecast = require(&context.forecast, "forecast dataset")?;
        let hierarchy = require(&context.hierarchy, "hierarchy")?;

        ensure!(
            forecast.years() == predicted.years(),
            "Forecast and prediction year axes differ ({} vs {} years)",
            forecast.years().len(),
            predicted.years().len()
        );

        let aligned_forecast = forecast.demographic_intersection(predicted);

        let known: HashSet<i64> = hierarchy.location_ids().collect();
        let before = predicted.locations().len();
        let restricted = predicted.retain_locations(&known);
        debug!(
            dropped = before - restricted.locations().len(),
            kept = restricted.locations().len(),
            "Restricted predictions to admin-2 locations"
        );

        context.forecast = Some(aligned_forecast);
        context.predicted = Some(restricted);
        Ok(())
    }
}
