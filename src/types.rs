//! Core data types shared across the walker modules

use crate::error::WalkError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shape of an opened repository, classified once at open time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryShape {
    /// Regular repository with a working directory
    Normal,
    /// Bare repository; no checked-out HEAD, so `is_head` is always false
    Bare,
    /// History artificially truncated; rejected before traversal
    Shallow,
    /// Some objects are promised by a remote; rejected before traversal
    Partial,
}

/// One (commit, path) occurrence of a blob that survived filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    /// Full commit SHA hash
    pub commit_id: String,
    /// Repository-relative path of the blob at this commit
    pub path: String,
    /// True iff this record references the resolved HEAD commit
    pub is_head: bool,
    /// True iff the commit has two or more parents
    pub is_merge: bool,
    /// Author's name
    pub author_name: String,
    /// Author's email address
    pub author_email: String,
    /// Commit timestamp (Unix epoch seconds)
    pub commit_timestamp: i64,
    /// First line of the commit message
    pub commit_message_summary: String,
}

/// The unit emitted to downstream consumers.
///
/// Exactly one record exists per unique blob identifier that passed
/// filtering at least once; `provenance` lists every surviving
/// (commit, path) occurrence in discovery order.
#[derive(Debug, Clone)]
pub struct UniqueBlobRecord {
    /// Content hash identifying the blob
    pub blob_id: String,
    /// Raw blob bytes
    pub content: Vec<u8>,
    /// Byte length of the content
    pub size: u64,
    /// Every (commit, path) occurrence, in discovery order
    pub provenance: Vec<ProvenanceRecord>,
}

/// Cumulative counters for one walk session.
///
/// Monotonically updated and valid even on a cancelled or partial run.
#[derive(Debug, Clone, Default)]
pub struct WalkStatistics {
    pub commits_visited: u64,
    /// Unique blobs actually yielded to the consumer
    pub blobs_emitted: u64,
    /// Candidate occurrences excluded by ignore rules, filters or pre-seeding
    pub blobs_skipped: u64,
    pub elapsed: Duration,
    /// Recoverable per-item failures, in discovery order
    pub errors: Vec<WalkError>,
}

/// Snapshot handed to the progress callback at a bounded cadence
#[derive(Debug, Clone)]
pub struct WalkProgress {
    pub commits_visited: u64,
    /// Best-effort upfront estimate of reachable commits
    pub commits_total: Option<u64>,
    pub unique_blobs_found: u64,
    /// First line of the most recently visited commit's message
    pub current_commit_summary: String,
}
