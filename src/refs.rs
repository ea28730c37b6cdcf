//! Resolution of configured reference names to starting commits

use crate::error::{Result, WalkerError};
use crate::repo::RepositoryHandle;
use git2::{ObjectType, Oid};
use std::collections::HashSet;

/// One resolved starting point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartCommit {
    /// The reference name as configured (e.g. "HEAD", "refs/heads/main")
    pub name: String,
    pub commit_id: Oid,
}

/// Ordered, de-duplicated starting points plus the HEAD designation
#[derive(Debug, Clone)]
pub struct ResolvedRefs {
    pub starts: Vec<StartCommit>,
    /// Commit used for `is_head` evaluation, when one of the configured
    /// references is (or resolves to the same commit as) repository HEAD
    pub head_commit: Option<Oid>,
}

impl ResolvedRefs {
    pub fn start_ids(&self) -> Vec<Oid> {
        self.starts.iter().map(|s| s.commit_id).collect()
    }
}

/// Resolves reference names against one repository
pub struct RefResolver<'repo> {
    handle: &'repo RepositoryHandle,
}

impl<'repo> RefResolver<'repo> {
    pub fn new(handle: &'repo RepositoryHandle) -> Self {
        Self { handle }
    }

    /// Resolve each name to a commit, deduplicating identical resolutions
    /// while preserving configuration order
    pub fn resolve(&self, names: &[String]) -> Result<ResolvedRefs> {
        let repo = self.handle.repo();
        let mut starts = Vec::new();
        let mut resolved_ids = HashSet::new();

        for name in names {
            let object = repo
                .revparse_single(name)
                .map_err(|_| WalkerError::RefNotFound(name.clone()))?;
            let commit = object
                .peel(ObjectType::Commit)
                .map_err(|_| WalkerError::RefNotFound(name.clone()))?;
            let commit_id = commit.id();

            if resolved_ids.insert(commit_id) {
                starts.push(StartCommit {
                    name: name.clone(),
                    commit_id,
                });
            } else {
                tracing::debug!("Reference '{}' duplicates an earlier start, skipping", name);
            }
        }

        if starts.is_empty() {
            return Err(WalkerError::NoStartingCommits);
        }

        let repo_head = repo.head().ok().and_then(|head| head.target());
        let head_commit = starts
            .iter()
            .find(|start| start.name == "HEAD" || Some(start.commit_id) == repo_head)
            .map(|start| start.commit_id);

        tracing::info!(
            "Resolved {} starting commit(s) from {} reference(s)",
            starts.len(),
            names.len()
        );

        Ok(ResolvedRefs {
            starts,
            head_commit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature, Time};
    use tempfile::TempDir;

    fn repo_with_commit() -> (TempDir, RepositoryHandle) {
        let dir = TempDir::new().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("init");

        let tree_id = {
            let mut index = repo.index().expect("index");
            index.write_tree().expect("tree")
        };
        let tree = repo.find_tree(tree_id).expect("find tree");
        let sig = Signature::new("Test", "test@example.com", &Time::new(1_700_000_000, 0))
            .expect("signature");
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .expect("commit");
        drop(tree);

        let handle = RepositoryHandle::open(dir.path()).expect("open");
        (dir, handle)
    }

    #[test]
    fn test_resolve_head() {
        let (_dir, handle) = repo_with_commit();
        let resolver = RefResolver::new(&handle);

        let resolved = resolver.resolve(&["HEAD".to_string()]).expect("resolve");
        assert_eq!(resolved.starts.len(), 1);
        assert_eq!(resolved.head_commit, Some(resolved.starts[0].commit_id));
    }

    #[test]
    fn test_duplicate_refs_collapse() {
        let (_dir, handle) = repo_with_commit();
        let resolver = RefResolver::new(&handle);

        // HEAD and the default branch point at the same commit
        let branch = handle
            .repo()
            .head()
            .expect("head")
            .shorthand()
            .expect("shorthand")
            .to_string();
        let resolved = resolver
            .resolve(&["HEAD".to_string(), branch])
            .expect("resolve");
        assert_eq!(resolved.starts.len(), 1);
    }

    #[test]
    fn test_unknown_ref() {
        let (_dir, handle) = repo_with_commit();
        let resolver = RefResolver::new(&handle);

        let err = resolver
            .resolve(&["refs/heads/no-such-branch".to_string()])
            .expect_err("should fail");
        assert!(matches!(err, WalkerError::RefNotFound(_)));
    }

    #[test]
    fn test_head_designation_via_branch_name() {
        let (_dir, handle) = repo_with_commit();
        let resolver = RefResolver::new(&handle);

        let branch = handle
            .repo()
            .head()
            .expect("head")
            .shorthand()
            .expect("shorthand")
            .to_string();
        let resolved = resolver.resolve(&[branch]).expect("resolve");
        // The branch resolves to the same commit as HEAD, so it is designated
        assert_eq!(resolved.head_commit, Some(resolved.starts[0].commit_id));
    }
}
