//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the hierarchy invariants.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("cycle detected in package hierarchy: {0}")]
    CycleDetected(String),

    #[error("entity occurs more than once in hierarchy: {0}")]
    DuplicateEntity(String),

    #[error("unknown package: {0}")]
    UnknownPackage(String),

    #[error("invalid entity {guid}: {message}")]
    InvalidEntity { guid: String, message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
