//! Content-identity deduplication and provenance accumulation
//!
//! Session-scoped by construction: every walk owns its own index, so
//! concurrent sessions never share state. Pre-seeding with externally
//! known identifiers supports resuming a prior incomplete run.

use crate::types::ProvenanceRecord;
use std::collections::{HashMap, HashSet};

/// Tracks which blob identifiers have been emitted (or pre-seeded / rejected)
/// and accumulates ordered provenance per emitted blob
#[derive(Debug, Default)]
pub struct DeduplicationIndex {
    /// Ids whose content is already accounted for: pre-seeded or emitted
    seen: HashSet<String>,
    /// Ids whose content failed the filter pipeline; verdicts are cached so
    /// each distinct blob is filtered at most once
    rejected: HashSet<String>,
    /// Provenance per blob emitted by this walk, in discovery order
    provenance: HashMap<String, Vec<ProvenanceRecord>>,
    /// Emission order: first-pass, first-seen
    emission_order: Vec<String>,
}

impl DeduplicationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed with identifiers indexed by a prior run.
    ///
    /// Pre-seeded blobs are never emitted and accumulate no provenance.
    pub fn preseed<I>(&mut self, blob_ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.seen.extend(blob_ids);
    }

    pub fn has_seen(&self, blob_id: &str) -> bool {
        self.seen.contains(blob_id)
    }

    /// Check-and-set dedup gate. Returns true only for the first caller to
    /// mark this id; pre-seeded ids always return false.
    ///
    /// A true return slates the blob for emission and opens its provenance
    /// list.
    pub fn mark_seen(&mut self, blob_id: &str) -> bool {
        if !self.seen.insert(blob_id.to_string()) {
            return false;
        }
        self.emission_order.push(blob_id.to_string());
        self.provenance.insert(blob_id.to_string(), Vec::new());
        true
    }

    /// Cache a filter rejection so later occurrences skip re-filtering
    pub fn mark_rejected(&mut self, blob_id: &str) {
        self.rejected.insert(blob_id.to_string());
    }

    pub fn is_rejected(&self, blob_id: &str) -> bool {
        self.rejected.contains(blob_id)
    }

    /// Append a provenance record for a blob slated for emission.
    ///
    /// Returns false (and records nothing) for pre-seeded or unknown ids;
    /// a blob emitted earlier in the walk keeps accumulating records.
    pub fn record_provenance(&mut self, blob_id: &str, record: ProvenanceRecord) -> bool {
        if let Some(records) = self.provenance.get_mut(blob_id) {
            records.push(record);
            true
        } else {
            false
        }
    }

    /// Number of blobs slated for emission by this walk
    pub fn unique_blob_count(&self) -> u64 {
        self.emission_order.len() as u64
    }

    /// Consume the index into (emission order, provenance map)
    pub fn into_emission(self) -> (Vec<String>, HashMap<String, Vec<ProvenanceRecord>>) {
        (self.emission_order, self.provenance)
    }
}
