//! Typed error hierarchy for the taskdeck service.
//!
//! Three top-level enums cover the three subsystems:
//! - `IdentifierError` — rejected project ids and commit hashes
//! - `StoreError` — workspace document read/write failures
//! - `GitError` — git subprocess failures and timeouts

use thiserror::Error;

/// Errors from identifier validation.
///
/// Raised before any filesystem or subprocess access; a rejected
/// identifier has no side effects.
#[derive(Debug, Error)]
pub enum IdentifierError {
    #[error("Project id is empty")]
    EmptyProjectId,

    #[error("Project id '{0}' contains a path traversal or separator sequence")]
    PathTraversal(String),

    #[error("Project id '{0}' contains characters outside [A-Za-z0-9_-]")]
    InvalidCharacters(String),

    #[error("Commit hash is empty")]
    EmptyHash,

    #[error("Commit hash '{0}' is not hexadecimal")]
    NonHexHash(String),
}

/// Errors from the workspace document store.
///
/// A missing document is not an error anywhere in the store; these
/// variants cover real I/O and serialization failures only.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to replace {path}: {source}")]
    RenameFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document at {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize document for {path}: {source}")]
    Serialize {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the git activity provider.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to spawn git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git exited with status {status}: {stderr}")]
    NonZeroExit { status: i32, stderr: String },

    #[error("git timed out after {seconds}s")]
    Timeout { seconds: u64 },
}
