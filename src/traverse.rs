//! Visit-once traversal over the commit graph
//!
//! The traversal keeps an explicit frontier (a max-heap keyed by commit
//! timestamp, ties broken by commit id so runs are deterministic) and an
//! explicit visited set of commit identifiers. No commit objects are held
//! beyond the one currently being visited.

use crate::error::Result;
use git2::{Oid, Repository};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// One visited commit plus the metadata provenance records need
#[derive(Debug, Clone)]
pub struct CommitVisit {
    pub id: Oid,
    /// True iff the commit has two or more parents (octopus merges included)
    pub is_merge: bool,
    pub author_name: String,
    pub author_email: String,
    /// Commit timestamp (Unix epoch seconds)
    pub timestamp: i64,
    /// First line of the commit message
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    timestamp: i64,
    id: Oid,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reverse-chronological, visit-once walk from a set of starting commits
pub struct CommitTraverser<'repo> {
    repo: &'repo Repository,
    frontier: BinaryHeap<FrontierEntry>,
    visited: HashSet<Oid>,
}

impl<'repo> CommitTraverser<'repo> {
    pub fn new(repo: &'repo Repository, starts: &[Oid]) -> Result<Self> {
        let mut frontier = BinaryHeap::new();
        for &id in starts {
            let commit = repo.find_commit(id)?;
            frontier.push(FrontierEntry {
                timestamp: commit.time().seconds(),
                id,
            });
        }
        Ok(Self {
            repo,
            frontier,
            visited: HashSet::new(),
        })
    }

    /// Pop the next unvisited commit, newest first, or `None` when the
    /// frontier is exhausted.
    ///
    /// A commit reachable via multiple references or merge paths is
    /// returned exactly once regardless of in-degree.
    pub fn next_commit(&mut self) -> Result<Option<CommitVisit>> {
        while let Some(entry) = self.frontier.pop() {
            if !self.visited.insert(entry.id) {
                continue;
            }

            let commit = self.repo.find_commit(entry.id)?;
            let parent_ids: Vec<Oid> = commit.parent_ids().collect();
            for parent_id in &parent_ids {
                if !self.visited.contains(parent_id) {
                    let parent = self.repo.find_commit(*parent_id)?;
                    self.frontier.push(FrontierEntry {
                        timestamp: parent.time().seconds(),
                        id: *parent_id,
                    });
                }
            }

            let author = commit.author();
            let visit = CommitVisit {
                id: entry.id,
                is_merge: parent_ids.len() >= 2,
                author_name: author.name().unwrap_or("Unknown").to_string(),
                author_email: author.email().unwrap_or("").to_string(),
                timestamp: commit.time().seconds(),
                summary: commit.summary().unwrap_or("").to_string(),
            };
            return Ok(Some(visit));
        }
        Ok(None)
    }

    /// Number of commits returned so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Best-effort total of reachable commits, for progress reporting only
    pub fn estimate_total(repo: &Repository, starts: &[Oid]) -> Result<u64> {
        let mut revwalk = repo.revwalk()?;
        for &id in starts {
            revwalk.push(id)?;
        }
        Ok(revwalk.count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature, Time};
    use tempfile::TempDir;

    fn commit(
        repo: &Repository,
        parents: &[Oid],
        message: &str,
        timestamp: i64,
        update_head: bool,
    ) -> Oid {
        let mut index = repo.index().expect("index");
        if let Some(first) = parents.first() {
            let parent_tree = repo.find_commit(*first).expect("parent").tree().expect("tree");
            index.read_tree(&parent_tree).expect("read tree");
        }
        let tree_id = index.write_tree().expect("write tree");
        let tree = repo.find_tree(tree_id).expect("find tree");
        let sig =
            Signature::new("Test", "test@example.com", &Time::new(timestamp, 0)).expect("sig");
        let parent_commits: Vec<_> = parents
            .iter()
            .map(|id| repo.find_commit(*id).expect("find parent"))
            .collect();
        let parent_refs: Vec<_> = parent_commits.iter().collect();
        // Merge fixtures cannot advance HEAD through repo.commit (the tip
        // is not the first parent), so HEAD is moved explicitly
        let oid = repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .expect("commit");
        if update_head {
            repo.set_head_detached(oid).expect("set head");
        }
        oid
    }

    #[test]
    fn test_linear_history_newest_first() {
        let dir = TempDir::new().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("init");

        let a = commit(&repo, &[], "a", 100, true);
        let b = commit(&repo, &[a], "b", 200, true);
        let c = commit(&repo, &[b], "c", 300, true);

        let mut traverser = CommitTraverser::new(&repo, &[c]).expect("new");
        let order: Vec<Oid> = std::iter::from_fn(|| {
            traverser.next_commit().expect("next").map(|v| v.id)
        })
        .collect();
        assert_eq!(order, vec![c, b, a]);
    }

    #[test]
    fn test_merge_commit_visited_once() {
        let dir = TempDir::new().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("init");

        let a = commit(&repo, &[], "a", 100, true);
        let b = commit(&repo, &[a], "b", 200, false);
        let c = commit(&repo, &[a], "c", 250, false);
        let m = commit(&repo, &[b, c], "merge", 300, true);

        let mut traverser = CommitTraverser::new(&repo, &[m]).expect("new");
        let mut visits = Vec::new();
        while let Some(visit) = traverser.next_commit().expect("next") {
            visits.push(visit);
        }

        // Every commit appears exactly once even though `a` has in-degree 2
        let ids: Vec<Oid> = visits.iter().map(|v| v.id).collect();
        assert_eq!(ids.len(), 4);
        let unique: HashSet<Oid> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 4);

        let merge = visits.iter().find(|v| v.id == m).expect("merge visit");
        assert!(merge.is_merge);
        assert!(!visits.iter().find(|v| v.id == b).expect("b").is_merge);
    }

    #[test]
    fn test_multiple_starts_shared_history() {
        let dir = TempDir::new().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("init");

        let a = commit(&repo, &[], "a", 100, true);
        let b = commit(&repo, &[a], "b", 200, false);
        let c = commit(&repo, &[a], "c", 250, false);

        let mut traverser = CommitTraverser::new(&repo, &[b, c]).expect("new");
        let mut count = 0;
        while traverser.next_commit().expect("next").is_some() {
            count += 1;
        }
        // a is reachable from both starts but visited once
        assert_eq!(count, 3);
        assert_eq!(traverser.visited_count(), 3);
    }

    #[test]
    fn test_deterministic_order_across_runs() {
        let dir = TempDir::new().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("init");

        let a = commit(&repo, &[], "a", 100, true);
        // Same timestamp forces the id tiebreak
        let b = commit(&repo, &[a], "b", 200, false);
        let c = commit(&repo, &[a], "c", 200, false);
        let m = commit(&repo, &[b, c], "merge", 300, true);

        let run = || -> Vec<Oid> {
            let mut traverser = CommitTraverser::new(&repo, &[m]).expect("new");
            std::iter::from_fn(|| traverser.next_commit().expect("next").map(|v| v.id)).collect()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_estimate_total() {
        let dir = TempDir::new().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("init");

        let a = commit(&repo, &[], "a", 100, true);
        let b = commit(&repo, &[a], "b", 200, true);

        let total = CommitTraverser::estimate_total(&repo, &[b]).expect("estimate");
        assert_eq!(total, 2);
    }
}
