//! # blobwalk - Commit-Graph Walker with Content-Addressed Blob Deduplication
//!
//! A library that traverses a git repository's commit history, extracts the
//! set of unique file-content blobs referenced by tracked paths, and records,
//! for every unique blob, the complete provenance of every commit/path where
//! it appears.
//!
//! ## Overview
//!
//! blobwalk feeds downstream chunking/embedding/indexing pipelines. It
//! deduplicates identical content across millions of (commit, path)
//! occurrences using content identity alone, handles irregular graph shapes
//! (merges, multiple refs, bare repositories) and applies a multi-stage
//! content filter without loading entire histories into memory.
//!
//! ## Key Features
//!
//! - **Content dedup**: each unique blob is emitted exactly once, with the
//!   ordered list of every (commit, path) occurrence that survived filtering
//! - **Visit-once traversal**: explicit frontier + visited set over commit
//!   identifiers; merges and multiple refs never double-visit
//! - **Filter pipeline**: size limit, binary detection, git-lfs pointer
//!   detection and UTF-8 validation, short-circuiting per distinct blob
//! - **HEAD-tree ignore rules**: `.gitignore` patterns compiled once from
//!   the tip of history and applied to every historical path
//! - **Resumable**: pre-seed the dedup index with already-indexed blob
//!   identifiers to skip prior work
//! - **Cancellable**: cooperative cancellation with statistics that stay
//!   valid up to the cancellation point
//!
//! ## Architecture
//!
//! ```text
//! WalkSession
//!     ├── RepositoryHandle   (open + shape classification)
//!     ├── RefResolver        (names -> starting commits, HEAD designation)
//!     ├── CommitTraverser    (visit-once, newest first)
//!     │       └── TreeExtractor  (per commit: (blob, path) pairs)
//!     ├── IgnoreMatcher      (HEAD-tree .gitignore rules)
//!     ├── ContentFilter      (size / binary / lfs / encoding)
//!     └── DeduplicationIndex (seen-set + provenance multimap)
//!             └── BlobStream (lazy UniqueBlobRecord emission)
//! ```
//!
//! ## Modules
//!
//! - [`session`]: `WalkSession` orchestration and the `BlobStream` output
//! - [`repo`]: repository access and shape classification
//! - [`refs`]: reference resolution
//! - [`traverse`]: visit-once commit-graph traversal
//! - [`tree`]: per-commit tree extraction
//! - [`ignore_rules`]: HEAD-tree ignore-pattern matching
//! - [`filter`]: content filter pipeline
//! - [`dedup`]: deduplication index and provenance accumulation
//! - [`stats`]: shared walk statistics
//! - [`options`]: session configuration
//! - [`types`]: emitted records and supporting types
//! - [`error`]: fatal and per-item error types
//!
//! ## Usage Example
//!
//! ```no_run
//! use blobwalk::{WalkOptions, WalkSession};
//!
//! fn main() -> blobwalk::Result<()> {
//!     let options = WalkOptions::new("/path/to/repo").with_max_blob_size(1_048_576);
//!     let session = WalkSession::new(options)?;
//!     let stats = session.stats_handle();
//!
//!     for record in session.run()? {
//!         println!(
//!             "{} ({} bytes, {} occurrence(s))",
//!             record.blob_id,
//!             record.size,
//!             record.provenance.len()
//!         );
//!     }
//!
//!     let snapshot = stats.snapshot();
//!     println!("visited {} commits", snapshot.commits_visited);
//!     Ok(())
//! }
//! ```

/// Deduplication index and provenance accumulation
pub mod dedup;

/// Fatal and per-item error types
pub mod error;

/// Content filter pipeline over raw blob bytes
pub mod filter;

/// Ignore-pattern matching from the HEAD tree
pub mod ignore_rules;

/// Session configuration
pub mod options;

/// Reference resolution to starting commits
pub mod refs;

/// Repository access and shape classification
pub mod repo;

/// Walk session orchestration and the output stream
pub mod session;

/// Shared walk statistics
pub mod stats;

/// Visit-once commit-graph traversal
pub mod traverse;

/// Per-commit tree extraction
pub mod tree;

/// Emitted records and supporting types
pub mod types;

pub use error::{Result, WalkError, WalkErrorKind, WalkerError};
pub use options::WalkOptions;
pub use session::{BlobStream, CancellationFlag, ProgressCallback, SessionState, WalkSession};
pub use stats::StatsHandle;
pub use types::{
    ProvenanceRecord, RepositoryShape, UniqueBlobRecord, WalkProgress, WalkStatistics,
};
