//! Extraction of (blob, path) pairs from one commit's file tree

use crate::error::Result;
use git2::{ObjectType, Oid, Repository, TreeWalkMode, TreeWalkResult};

/// A file entry discovered in a commit's tree.
///
/// Symbolic links appear as blobs whose content is the link-target text;
/// submodule (gitlink) entries are never yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    pub blob_id: Oid,
    /// Repository-relative path
    pub path: String,
}

/// Recursively walks one commit's tree
pub struct TreeExtractor<'repo> {
    repo: &'repo Repository,
}

impl<'repo> TreeExtractor<'repo> {
    pub fn new(repo: &'repo Repository) -> Self {
        Self { repo }
    }

    /// Yield every blob entry in the commit's tree, in tree order
    pub fn extract(&self, commit_id: Oid) -> Result<Vec<BlobEntry>> {
        let commit = self.repo.find_commit(commit_id)?;
        let tree = commit.tree()?;

        let mut entries = Vec::new();
        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            // Gitlinks have kind Commit and are treated as opaque, not recursed
            if entry.kind() == Some(ObjectType::Blob)
                && let Some(name) = entry.name()
            {
                entries.push(BlobEntry {
                    blob_id: entry.id(),
                    path: format!("{root}{name}"),
                });
            }
            TreeWalkResult::Ok
        })?;

        Ok(entries)
    }
}
