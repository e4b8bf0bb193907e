pub mod config;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod hierarchy;
pub mod progress;
pub mod rake;
pub mod storage;

pub use config::{ConfigError, ForecastVersion, RakeConfig};
pub use dataset::BurdenDataset;
pub use domain::{Cause, Draw, DomainError, JobGrid, Measure, RakingJob, Scenario, DRAW_COUNT};
pub use error::{DatasetError, StorageError};
pub use hierarchy::{HierarchyEntry, ImputeMap, ImputePair, LocationHierarchy, ADMIN2_LEVEL};
pub use progress::{LoggingHandler, ProgressEvent, ProgressHandler};
pub use storage::DrawBundle;
