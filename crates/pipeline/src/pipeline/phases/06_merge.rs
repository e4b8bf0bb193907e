use crate::pipeline::context::{require, RakingContext};
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Reattach the unraked passthrough locations to the raked dataset.
pub struct MergePhase;

#[async_trait]
impl WorkflowPhase for MergePhase {
    fn name(&self) -> &'static str {
        "MergePhase"
    }

    async fn execute(&self, context: &mut RakingContext) -> Result<()> {
        let raked = require(&context.raked, "raked dataset")?;
        let passthrough = require(&context.admin2_without_parent, "passthrough dataset")?;

        let merged = raked
            .concat_locations(passthrough)
            .context("Merging raked and passthrough locations")?;

        debug!(
            locations = merged.locations().len(),
            total = merged.total(),
            "Merged output dataset"
        );

        context.merged = Some(merged);
        Ok(())
    }
}
