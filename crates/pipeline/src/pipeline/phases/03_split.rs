use crate::pipeline::context::{require, RakingContext};
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

/// Partition admin-2 locations by whether their parent appears in the
/// forecast, and cut the forecast down to those parents.
pub struct SplitPhase;

#[async_trait]
impl WorkflowPhase for SplitPhase {
    fn name(&self) -> &'static str {
        "SplitPhase"
    }

    async fn execute(&self, context: &mut RakingContext) -> Result<()> {
        let predicted = require(&context.predicted, "predicted dataset")?;
        let forecast = require(&context.forecast, "forecast dataset")?;
        let hierarchy = require(&context.hierarchy, "hierarchy")?;

        let forecast_locations: HashSet<i64> = forecast.locations().iter().copied().collect();

        let mut rakeable: HashSet<i64> = HashSet::new();
        let mut passthrough: HashSet<i64> = HashSet::new();
        let mut parents: HashSet<i64> = HashSet::new();
        for &child in predicted.locations() {
            match hierarchy.parent_of(child) {
                Some(parent) if forecast_locations.contains(&parent) => {
                    rakeable.insert(child);
                    parents.insert(parent);
                }
                _ => {
                    passthrough.insert(child);
                }
            }
        }

        let with_parent = predicted.retain_locations(&rakeable);
        let without_parent = predicted.retain_locations(&passthrough);

        let mut parent_ids: Vec<i64> = parents.into_iter().collect();
        parent_ids.sort_unstable();
        let admin1_targets = forecast.select_locations(&parent_ids)?;

        debug!(
            rakeable = with_parent.locations().len(),
            passthrough = without_parent.locations().len(),
            parents = parent_ids.len(),
            "Split admin-2 locations by forecast coverage"
        );

        context.admin2_with_parent = Some(with_parent);
        context.admin2_without_parent = Some(without_parent);
        context.admin1_targets = Some(admin1_targets);
        Ok(())
    }
}
