use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Value buffer has {actual} cells, axes imply {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Duplicate ids on axis {axis}")]
    DuplicateCoordinate { axis: String },

    #[error("Unknown location_id: {0}")]
    UnknownLocation(i64),

    #[error("Unknown {axis}: {id}")]
    UnknownCoordinate { axis: String, id: i64 },

    #[error("Demographic axes do not match ({context})")]
    AxisMismatch { context: String },

    #[error("Draw {draw} not present in forecast bundle")]
    DrawNotInBundle { draw: u16 },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Input does not exist: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<bincode::ErrorKind>,
    },

    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: Box<bincode::ErrorKind>,
    },

    #[error("Failed to parse hierarchy {}: {source}", path.display())]
    Hierarchy {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid hierarchy {}: {source}", path.display())]
    InvalidHierarchy {
        path: PathBuf,
        #[source]
        source: crate::hierarchy::HierarchyError,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}
