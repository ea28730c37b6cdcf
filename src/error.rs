//! Centralized error types for blobwalk using thiserror
//!
//! Fatal errors abort a session before any output is produced; per-item
//! failures are data (`WalkError`) collected in the session statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result alias for fallible walker operations
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Fatal errors that abort a walk session
#[derive(Error, Debug)]
pub enum WalkerError {
    #[error("Git repository not found at: {0}")]
    RepositoryNotFound(String),

    #[error(
        "Repository at '{0}' is a shallow clone; fetch the full history first \
         (git fetch --unshallow)"
    )]
    ShallowClone(String),

    #[error(
        "Repository at '{0}' is a partial clone; fetch all objects first \
         (git fetch --refetch or re-clone without --filter)"
    )]
    PartialClone(String),

    #[error("Failed to resolve reference: {0}")]
    RefNotFound(String),

    #[error("No starting commits could be resolved from the configured references")]
    NoStartingCommits,

    #[error("Invalid walk options: {0}")]
    InvalidOptions(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("{0}")]
    Other(String),
}

// Conversion from anyhow::Error for internal helpers that use .context()
impl From<anyhow::Error> for WalkerError {
    fn from(err: anyhow::Error) -> Self {
        WalkerError::Other(format!("{:#}", err))
    }
}

impl WalkerError {
    /// Check if this error means the repository needs a deeper fetch
    /// before it can be walked faithfully
    pub fn needs_full_fetch(&self) -> bool {
        matches!(
            self,
            WalkerError::ShallowClone(_) | WalkerError::PartialClone(_)
        )
    }
}

/// Classification of a recoverable, per-item failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkErrorKind {
    /// Blob content could not be read from the object store
    CorruptBlob,
    /// Blob exceeds the configured maximum size
    OversizedBlob,
    /// Blob is a git-lfs pointer file, not the real content
    LfsPointer,
    /// Blob content is not valid UTF-8 text
    InvalidEncoding,
}

impl WalkErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalkErrorKind::CorruptBlob => "corrupt_blob",
            WalkErrorKind::OversizedBlob => "oversized_blob",
            WalkErrorKind::LfsPointer => "lfs_pointer",
            WalkErrorKind::InvalidEncoding => "invalid_encoding",
        }
    }
}

/// A recoverable failure attributed to one blob occurrence.
///
/// Collected into `WalkStatistics.errors`; never aborts the traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkError {
    pub kind: WalkErrorKind,
    /// Blob identifier, when one was resolved before the failure
    pub blob_id: Option<String>,
    pub commit_id: String,
    pub path: String,
    pub message: String,
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}: {}",
            self.kind.as_str(),
            self.commit_id,
            self.path,
            self.message
        )
    }
}
