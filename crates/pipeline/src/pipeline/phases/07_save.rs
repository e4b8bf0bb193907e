use crate::pipeline::context::{require, RakingContext};
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;
use vbdrake_core::storage;

/// Write the merged dataset into the raked output layout. The only phase
/// with write side effects.
pub struct SavePhase;

#[async_trait]
impl WorkflowPhase for SavePhase {
    fn name(&self) -> &'static str {
        "SavePhase"
    }

    async fn execute(&self, context: &mut RakingContext) -> Result<()> {
        let merged = require(&context.merged, "merged dataset")?;

        let path = storage::output_path(&context.config, &context.job);
        storage::write_dataset(&path, merged)
            .with_context(|| format!("Saving raked output for {}", context.job))?;

        info!(path = %path.display(), "Saved raked dataset");
        context.output_path = Some(path);
        Ok(())
    }
}
