pub mod context;
pub mod orchestrator;
pub mod phase_trait;
pub mod phases;

pub use context::RakingContext;
pub use orchestrator::PipelineOrchestrator;
pub use phase_trait::WorkflowPhase;
