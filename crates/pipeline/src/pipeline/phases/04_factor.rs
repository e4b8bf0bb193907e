use crate::pipeline::context::{require, RakingContext};
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;
use vbdrake_core::rake;

/// Sum admin-2 values into their parents and divide the forecast by those
/// sums. Cells with a zero on either side keep an identity factor.
pub struct FactorPhase;

#[async_trait]
impl WorkflowPhase for FactorPhase {
    fn name(&self) -> &'static str {
        "FactorPhase"
    }

    async fn execute(&self, context: &mut RakingContext) -> Result<()> {
        let admin2 = require(&context.admin2_with_parent, "rakeable admin-2 dataset")?;
        let admin1 = require(&context.admin1_targets, "admin-1 targets")?;
        let hierarchy = require(&context.hierarchy, "hierarchy")?;

        let sums = rake::sum_to_parents(admin2, hierarchy, admin1.locations())
            .context("Summing admin-2 values to parents")?;
        let factors = rake::raking_factors(admin1, &sums).context("Computing raking factors")?;

        if let Some((min, max)) = rake::factor_range(&factors) {
            debug!(factor_min = min, factor_max = max, "Raking factors computed");
        }

        context.factors = Some(factors);
        Ok(())
    }
}
