//! Walk session orchestration
//!
//! Composes repository validation, reference resolution, traversal,
//! filtering and deduplication into a single operation, and exposes the
//! result as a lazy `BlobStream`.
//!
//! The walk is two-pass: traversal collects the complete provenance map
//! first (reading each candidate blob's bytes once, for filtering only),
//! then the stream re-reads content lazily per emitted record. Every
//! emitted record therefore carries its full provenance, and full blob
//! content is never resident all at once.

use crate::dedup::DeduplicationIndex;
use crate::error::{Result, WalkError, WalkErrorKind};
use crate::filter::{ContentFilter, FilterVerdict};
use crate::ignore_rules::IgnoreMatcher;
use crate::options::WalkOptions;
use crate::refs::{RefResolver, ResolvedRefs};
use crate::repo::RepositoryHandle;
use crate::stats::StatsHandle;
use crate::traverse::{CommitTraverser, CommitVisit};
use crate::tree::TreeExtractor;
use crate::types::{ProvenanceRecord, RepositoryShape, UniqueBlobRecord, WalkProgress, WalkStatistics};
use git2::Oid;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Candidate blobs are filtered in batches of this size; cancellation is
/// checked between batches so very large commits stay responsive
const FILTER_BATCH: usize = 64;

/// Callback invoked synchronously on the traversal thread at a bounded
/// cadence (`WalkOptions::progress_interval` commits)
pub type ProgressCallback = Box<dyn FnMut(WalkProgress) + Send>;

/// Cooperative cancellation signal shared with the walking thread
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    inner: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }
}

/// Lifecycle of one walk session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Validating,
    Traversing,
    Finalizing,
    Done,
    Aborted,
}

/// One walk over one repository.
///
/// Sessions are single-use: `run` consumes the session and returns the
/// output stream. A fresh session (optionally pre-seeded) is required to
/// walk again.
pub struct WalkSession {
    options: WalkOptions,
    stats: StatsHandle,
    cancel: CancellationFlag,
    progress: Option<ProgressCallback>,
    state: SessionState,
}

impl WalkSession {
    pub fn new(options: WalkOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            stats: StatsHandle::new(),
            cancel: CancellationFlag::new(),
            progress: None,
            state: SessionState::Created,
        })
    }

    /// Register a progress callback, invoked on the traversal thread
    pub fn with_progress(mut self, callback: impl FnMut(WalkProgress) + Send + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Flag that cancels this session when triggered from any thread
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Handle for reading statistics at any time, including mid-walk
    pub fn stats_handle(&self) -> StatsHandle {
        self.stats.clone()
    }

    pub fn statistics(&self) -> WalkStatistics {
        self.stats.snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Validate the repository, traverse reachable history and return the
    /// lazy output stream.
    ///
    /// Shape-detection failures (shallow or partial clones, missing
    /// repository) abort before any commit is visited.
    pub fn run(mut self) -> Result<BlobStream> {
        self.transition(SessionState::Validating);

        let handle = match self.validate_repository() {
            Ok(handle) => handle,
            Err(err) => return Err(self.abort(err)),
        };
        let resolved = match RefResolver::new(&handle).resolve(&self.options.refs) {
            Ok(resolved) => resolved,
            Err(err) => return Err(self.abort(err)),
        };
        let matcher = if self.options.respect_ignore_rules {
            match IgnoreMatcher::from_head_tree(handle.repo()) {
                Ok(matcher) => matcher,
                Err(err) => return Err(self.abort(err)),
            }
        } else {
            IgnoreMatcher::empty()
        };

        let filter = ContentFilter::from_options(&self.options);
        let mut dedup = DeduplicationIndex::new();
        dedup.preseed(self.options.seen_blobs.iter().cloned());

        self.transition(SessionState::Traversing);
        if let Err(err) = drive_walk(
            &self.options,
            &handle,
            &resolved,
            &matcher,
            &filter,
            &mut dedup,
            &self.stats,
            &self.cancel,
            &mut self.progress,
        ) {
            return Err(self.abort(err));
        }

        self.transition(SessionState::Finalizing);
        let (order, provenance) = dedup.into_emission();
        tracing::info!(
            "Walk finished: {} commit(s) visited, {} unique blob(s) found",
            self.stats.commits_visited(),
            order.len()
        );

        self.transition(SessionState::Done);
        Ok(BlobStream {
            handle,
            order: order.into_iter(),
            provenance,
            stats: self.stats,
            cancel: self.cancel,
            finished: false,
        })
    }

    fn validate_repository(&self) -> Result<RepositoryHandle> {
        let handle = RepositoryHandle::open(&self.options.repo_path)?;
        handle.validate()?;
        Ok(handle)
    }

    fn transition(&mut self, state: SessionState) {
        tracing::debug!("Session state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn abort(&mut self, err: crate::error::WalkerError) -> crate::error::WalkerError {
        self.transition(SessionState::Aborted);
        self.stats.freeze_elapsed();
        err
    }
}

#[allow(clippy::too_many_arguments)]
fn drive_walk(
    options: &WalkOptions,
    handle: &RepositoryHandle,
    resolved: &ResolvedRefs,
    matcher: &IgnoreMatcher,
    filter: &ContentFilter,
    dedup: &mut DeduplicationIndex,
    stats: &StatsHandle,
    cancel: &CancellationFlag,
    progress: &mut Option<ProgressCallback>,
) -> Result<()> {
    let repo = handle.repo();
    let starts = resolved.start_ids();
    let commits_total = CommitTraverser::estimate_total(repo, &starts).ok();

    // Bare repositories have no checked-out HEAD, so is_head never applies
    let head_commit = match handle.shape() {
        RepositoryShape::Bare => None,
        _ => resolved.head_commit,
    };

    let mut traverser = CommitTraverser::new(repo, &starts)?;
    let extractor = TreeExtractor::new(repo);
    let mut visited: u64 = 0;

    while let Some(visit) = traverser.next_commit()? {
        if cancel.is_cancelled() {
            tracing::info!("Walk cancelled after {} commit(s)", visited);
            break;
        }

        process_commit(
            options, handle, &extractor, matcher, filter, dedup, stats, cancel, &visit,
            head_commit,
        )?;
        stats.commit_visited();
        visited += 1;

        if visited % 50 == 0 {
            tracing::debug!("Processed {} commits", visited);
        }
        if visited % options.progress_interval == 0
            && let Some(callback) = progress.as_mut()
        {
            callback(WalkProgress {
                commits_visited: visited,
                commits_total,
                unique_blobs_found: stats.unique_blobs(),
                current_commit_summary: visit.summary.clone(),
            });
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn process_commit(
    options: &WalkOptions,
    handle: &RepositoryHandle,
    extractor: &TreeExtractor<'_>,
    matcher: &IgnoreMatcher,
    filter: &ContentFilter,
    dedup: &mut DeduplicationIndex,
    stats: &StatsHandle,
    cancel: &CancellationFlag,
    visit: &CommitVisit,
    head_commit: Option<Oid>,
) -> Result<()> {
    let entries = extractor.extract(visit.id)?;
    let commit_id = visit.id.to_string();
    let is_head = head_commit == Some(visit.id);

    // Pass 1: path-dependent exclusions in tree order. Ignore matches are
    // routine and unrecorded; surviving occurrences wait for the content
    // verdicts below.
    let mut pending: Vec<(String, String)> = Vec::new();
    let mut to_filter: Vec<String> = Vec::new();
    let mut first_paths: HashMap<String, String> = HashMap::new();

    for entry in entries {
        let blob_id = entry.blob_id.to_string();

        if options.respect_ignore_rules && matcher.matches(&entry.path) {
            stats.blob_skipped();
            tracing::debug!("Ignored path {}:{}", commit_id, entry.path);
            continue;
        }

        if !dedup.has_seen(&blob_id)
            && !dedup.is_rejected(&blob_id)
            && !first_paths.contains_key(&blob_id)
        {
            first_paths.insert(blob_id.clone(), entry.path.clone());
            to_filter.push(blob_id.clone());
        }
        pending.push((blob_id, entry.path));
    }

    // Pass 2: filter each distinct new blob once. Reads stay sequential
    // (object-store I/O); predicate evaluation fans out across the rayon
    // pool. Verdicts are applied in first-occurrence order so repeated
    // walks emit identical streams.
    for batch in to_filter.chunks(FILTER_BATCH) {
        if cancel.is_cancelled() {
            return Ok(());
        }

        let mut contents: Vec<(String, Vec<u8>)> = Vec::with_capacity(batch.len());
        for blob_id in batch {
            match handle.read_blob(blob_id) {
                Ok(bytes) => contents.push((blob_id.clone(), bytes)),
                Err(err) => {
                    dedup.mark_rejected(blob_id);
                    stats.push_error(WalkError {
                        kind: WalkErrorKind::CorruptBlob,
                        blob_id: Some(blob_id.clone()),
                        commit_id: commit_id.clone(),
                        path: first_paths.get(blob_id).cloned().unwrap_or_default(),
                        message: err.to_string(),
                    });
                }
            }
        }

        let verdicts: Vec<(String, FilterVerdict)> = contents
            .par_iter()
            .map(|(blob_id, bytes)| (blob_id.clone(), filter.evaluate(bytes)))
            .collect();
        // Content bytes are released here; nothing outlives the verdict
        drop(contents);

        for (blob_id, verdict) in verdicts {
            match verdict {
                FilterVerdict::Keep => {
                    if dedup.mark_seen(&blob_id) {
                        stats.unique_blob_found();
                    }
                }
                FilterVerdict::Skip => {
                    dedup.mark_rejected(&blob_id);
                }
                FilterVerdict::Reject { kind, message } => {
                    dedup.mark_rejected(&blob_id);
                    stats.push_error(WalkError {
                        kind,
                        blob_id: Some(blob_id.clone()),
                        commit_id: commit_id.clone(),
                        path: first_paths.get(&blob_id).cloned().unwrap_or_default(),
                        message,
                    });
                }
            }
        }
    }

    // Pass 3: provenance in tree order, whether or not the blob's content
    // was just slated for emission
    for (blob_id, path) in pending {
        let recorded = dedup.record_provenance(
            &blob_id,
            ProvenanceRecord {
                commit_id: commit_id.clone(),
                path,
                is_head,
                is_merge: visit.is_merge,
                author_name: visit.author_name.clone(),
                author_email: visit.author_email.clone(),
                commit_timestamp: visit.timestamp,
                commit_message_summary: visit.summary.clone(),
            },
        );
        if !recorded {
            // Pre-seeded, filter-rejected, or left unfiltered by cancellation
            stats.blob_skipped();
        }
    }

    Ok(())
}

/// Lazy, forward-only, single-pass sequence of `UniqueBlobRecord`.
///
/// Content is re-read from the object store as the stream advances, so at
/// most one emitted blob's bytes are resident at a time. The stream is
/// finite and not restartable once consumed.
pub struct BlobStream {
    handle: RepositoryHandle,
    order: std::vec::IntoIter<String>,
    provenance: HashMap<String, Vec<ProvenanceRecord>>,
    stats: StatsHandle,
    cancel: CancellationFlag,
    finished: bool,
}

impl BlobStream {
    /// Statistics for the session that produced this stream
    pub fn statistics(&self) -> WalkStatistics {
        self.stats.snapshot()
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.stats.freeze_elapsed();
        }
    }
}

impl Iterator for BlobStream {
    type Item = UniqueBlobRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.cancel.is_cancelled() {
                self.finish();
                return None;
            }
            let Some(blob_id) = self.order.next() else {
                self.finish();
                return None;
            };
            let provenance = self.provenance.remove(&blob_id).unwrap_or_default();

            match self.handle.read_blob(&blob_id) {
                Ok(content) => {
                    self.stats.blob_emitted();
                    let size = content.len() as u64;
                    return Some(UniqueBlobRecord {
                        blob_id,
                        content,
                        size,
                        provenance,
                    });
                }
                Err(err) => {
                    // The blob passed filtering earlier but vanished before
                    // emission; record and move on
                    let (commit_id, path) = provenance
                        .first()
                        .map(|record| (record.commit_id.clone(), record.path.clone()))
                        .unwrap_or_default();
                    self.stats.push_error(WalkError {
                        kind: WalkErrorKind::CorruptBlob,
                        blob_id: Some(blob_id),
                        commit_id,
                        path,
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}
