//! Error types for the engine and the snapshot store.

use thiserror::Error;

use crate::fields::NodeKind;

/// Errors raised by timeline assembly. Raised before any node is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    #[error("Malformed {kind:?} '{id}': {reason}")]
    MalformedEntity {
        kind: NodeKind,
        id: String,
        reason: &'static str,
    },
}

impl TimelineError {
    pub fn malformed(kind: NodeKind, id: &str, reason: &'static str) -> Self {
        TimelineError::MalformedEntity { kind, id: id.to_string(), reason }
    }
}

/// Errors raised while reading or writing a snapshot file.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TimelineError>;
