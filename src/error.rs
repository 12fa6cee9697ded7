//! Error types.
//!
//! Per-line parsing never fails: unrecognised lines become unidentified and
//! malformed numbers become absent data. What remains are I/O failures while
//! reading input and defects in the static catalogues themselves.

use crate::EventType;
use thiserror::Error;

/// A structural defect in the shape or analysis catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    #[error("finding key '{key}' has no valid level prefix (expected error., warn. or info.)")]
    InvalidLevel { key: String },

    #[error("event type {kind} declares more than one of blocking/concurrent/safepoint")]
    ConflictingCapabilities { kind: EventType },

    #[error("event type {kind} produced field '{field}' it does not declare")]
    UnexpectedField { kind: EventType, field: &'static str },
}

/// Errors returned by the public analysis entry points.
#[derive(Debug, Error)]
pub enum GcError {
    #[error("failed to read GC log: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
}
