use crate::pipeline::context::{require, RakingContext};
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::{Context, Result};
use async_trait::async_trait;
use vbdrake_core::rake;

/// Broadcast each parent's factors down to its admin-2 children.
pub struct ApplyPhase;

#[async_trait]
impl WorkflowPhase for ApplyPhase {
    fn name(&self) -> &'static str {
        "ApplyPhase"
    }

    async fn execute(&self, context: &mut RakingContext) -> Result<()> {
        let admin2 = require(&context.admin2_with_parent, "rakeable admin-2 dataset")?;
        let factors = require(&context.factors, "raking factors")?;
        let hierarchy = require(&context.hierarchy, "hierarchy")?;

        let raked = rake::apply_factors(admin2, factors, hierarchy)
            .context("Applying raking factors to admin-2 values")?;

        context.raked = Some(raked);
        Ok(())
    }
}
