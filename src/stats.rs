//! Shared, cheaply cloneable statistics for one walk session
//!
//! Counters are atomics and the error list sits behind a mutex, so a
//! snapshot is readable from any thread at any time, including mid-walk
//! and after cancellation.

use crate::error::WalkError;
use crate::types::WalkStatistics;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct StatsInner {
    commits_visited: AtomicU64,
    blobs_emitted: AtomicU64,
    blobs_skipped: AtomicU64,
    unique_blobs: AtomicU64,
    started: Instant,
    frozen_elapsed: Mutex<Option<Duration>>,
    errors: Mutex<Vec<WalkError>>,
}

/// Handle to the statistics of one session; clones share the same counters
#[derive(Debug, Clone)]
pub struct StatsHandle {
    inner: Arc<StatsInner>,
}

impl StatsHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StatsInner {
                commits_visited: AtomicU64::new(0),
                blobs_emitted: AtomicU64::new(0),
                blobs_skipped: AtomicU64::new(0),
                unique_blobs: AtomicU64::new(0),
                started: Instant::now(),
                frozen_elapsed: Mutex::new(None),
                errors: Mutex::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn commit_visited(&self) {
        self.inner.commits_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn blob_emitted(&self) {
        self.inner.blobs_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn blob_skipped(&self) {
        self.inner.blobs_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn unique_blob_found(&self) {
        self.inner.unique_blobs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn push_error(&self, error: WalkError) {
        tracing::warn!("{}", error);
        if let Ok(mut errors) = self.inner.errors.lock() {
            errors.push(error);
        }
    }

    /// Stop the elapsed clock; later snapshots report this duration.
    /// Idempotent: only the first call takes effect.
    pub(crate) fn freeze_elapsed(&self) {
        if let Ok(mut frozen) = self.inner.frozen_elapsed.lock()
            && frozen.is_none()
        {
            *frozen = Some(self.inner.started.elapsed());
        }
    }

    pub fn commits_visited(&self) -> u64 {
        self.inner.commits_visited.load(Ordering::Relaxed)
    }

    pub fn unique_blobs(&self) -> u64 {
        self.inner.unique_blobs.load(Ordering::Relaxed)
    }

    /// Consistent point-in-time view of all counters and errors
    pub fn snapshot(&self) -> WalkStatistics {
        let elapsed = self
            .inner
            .frozen_elapsed
            .lock()
            .ok()
            .and_then(|frozen| *frozen)
            .unwrap_or_else(|| self.inner.started.elapsed());
        let errors = self
            .inner
            .errors
            .lock()
            .map(|errors| errors.clone())
            .unwrap_or_default();

        WalkStatistics {
            commits_visited: self.inner.commits_visited.load(Ordering::Relaxed),
            blobs_emitted: self.inner.blobs_emitted.load(Ordering::Relaxed),
            blobs_skipped: self.inner.blobs_skipped.load(Ordering::Relaxed),
            elapsed,
            errors,
        }
    }
}

impl Default for StatsHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WalkErrorKind;

    #[test]
    fn test_counters() {
        let stats = StatsHandle::new();
        stats.commit_visited();
        stats.commit_visited();
        stats.blob_emitted();
        stats.blob_skipped();
        stats.unique_blob_found();

        let snap = stats.snapshot();
        assert_eq!(snap.commits_visited, 2);
        assert_eq!(snap.blobs_emitted, 1);
        assert_eq!(snap.blobs_skipped, 1);
        assert_eq!(stats.unique_blobs(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let stats = StatsHandle::new();
        let clone = stats.clone();
        clone.commit_visited();
        assert_eq!(stats.commits_visited(), 1);
    }

    #[test]
    fn test_errors_collected() {
        let stats = StatsHandle::new();
        stats.push_error(WalkError {
            kind: WalkErrorKind::CorruptBlob,
            blob_id: None,
            commit_id: "c1".to_string(),
            path: "a.txt".to_string(),
            message: "unreadable".to_string(),
        });

        let snap = stats.snapshot();
        assert_eq!(snap.errors.len(), 1);
        assert_eq!(snap.errors[0].kind, WalkErrorKind::CorruptBlob);
    }

    #[test]
    fn test_freeze_elapsed_is_idempotent() {
        let stats = StatsHandle::new();
        stats.freeze_elapsed();
        let first = stats.snapshot().elapsed;
        std::thread::sleep(std::time::Duration::from_millis(5));
        stats.freeze_elapsed();
        assert_eq!(stats.snapshot().elapsed, first);
    }
}
