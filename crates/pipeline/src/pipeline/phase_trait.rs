use super::context::RakingContext;
use anyhow::Result;
use async_trait::async_trait;

/// One step of the raking pipeline. Phases run strictly in order; each
/// reads slots earlier phases filled and fills its own.
#[async_trait]
pub trait WorkflowPhase: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, context: &mut RakingContext) -> Result<()>;
}
