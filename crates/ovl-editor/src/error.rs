//! Error types for the editing core.
//!
//! Identity misses are deliberately absent: an operation aimed at an id the
//! layer list or scene no longer holds is a no-op, not an error.

use crate::config::ConfigError;
use crate::task::TaskKind;
use ovl_core::ElementId;
use thiserror::Error;

/// Failure reported by the scene capability.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("node {0} not found in scene")]
    NodeNotFound(ElementId),
    #[error("failed to clone node: {0}")]
    Clone(String),
    #[error("failed to serialize scene: {0}")]
    Serialize(String),
    #[error("failed to deserialize scene: {0}")]
    Deserialize(String),
    #[error("failed to rasterize scene: {0}")]
    Rasterize(String),
}

/// Failure reading or writing the persisted-state blob.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("state store I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed persisted state: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0:?} task already in flight")]
    Busy(TaskKind),
}

pub type EditorResult<T> = Result<T, EditorError>;
