//! Input surface for a walk session
//!
//! Supports loading from serialized configuration with per-field defaults,
//! or construction in code via the builder-style `with_*` methods.

use crate::error::{Result, WalkerError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Configuration for one walk session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkOptions {
    /// Location of the repository to walk
    pub repo_path: PathBuf,

    /// Ordered set of reference names to start from
    #[serde(default = "default_refs")]
    pub refs: Vec<String>,

    /// Maximum blob size in bytes; larger blobs are recorded as errors
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: usize,

    /// Whether to exclude paths matched by HEAD-tree ignore rules
    #[serde(default = "default_true")]
    pub respect_ignore_rules: bool,

    /// Whether to silently exclude binary content
    #[serde(default = "default_true")]
    pub skip_binary: bool,

    /// Blob identifiers already indexed by a prior run; their content is
    /// never re-emitted (resume support)
    #[serde(default)]
    pub seen_blobs: HashSet<String>,

    /// Invoke the progress callback every this many visited commits
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

impl WalkOptions {
    pub fn new(repo_path: impl AsRef<Path>) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
            refs: default_refs(),
            max_blob_size: default_max_blob_size(),
            respect_ignore_rules: default_true(),
            skip_binary: default_true(),
            seen_blobs: HashSet::new(),
            progress_interval: default_progress_interval(),
        }
    }

    pub fn with_refs(mut self, refs: Vec<String>) -> Self {
        self.refs = refs;
        self
    }

    pub fn with_max_blob_size(mut self, max_blob_size: usize) -> Self {
        self.max_blob_size = max_blob_size;
        self
    }

    pub fn with_ignore_rules(mut self, respect: bool) -> Self {
        self.respect_ignore_rules = respect;
        self
    }

    pub fn with_skip_binary(mut self, skip: bool) -> Self {
        self.skip_binary = skip;
        self
    }

    /// Pre-seed the dedup index with already-indexed blob identifiers
    pub fn with_seen_blobs(mut self, seen_blobs: HashSet<String>) -> Self {
        self.seen_blobs = seen_blobs;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Check option consistency before any repository I/O
    pub fn validate(&self) -> Result<()> {
        if self.refs.is_empty() {
            return Err(WalkerError::InvalidOptions(
                "refs must contain at least one reference name".to_string(),
            ));
        }
        if self.max_blob_size == 0 {
            return Err(WalkerError::InvalidOptions(
                "max_blob_size must be greater than 0".to_string(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(WalkerError::InvalidOptions(
                "progress_interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_refs() -> Vec<String> {
    vec!["HEAD".to_string()]
}

fn default_max_blob_size() -> usize {
    1_048_576 // 1 MB
}

fn default_true() -> bool {
    true
}

fn default_progress_interval() -> u64 {
    50
}
