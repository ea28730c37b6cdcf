//! Shared git fixture builders for integration tests

use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

pub fn init_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().expect("tempdir");
    let repo = Repository::init(dir.path()).expect("init repo");
    (dir, repo)
}

pub fn init_bare_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().expect("tempdir");
    let repo = Repository::init_bare(dir.path()).expect("init bare repo");
    (dir, repo)
}

/// Create a commit whose tree is the first parent's tree plus `adds` minus
/// `removes`. Root commits start from an empty tree.
pub fn commit(
    repo: &Repository,
    parents: &[Oid],
    adds: &[(&str, &[u8])],
    removes: &[&str],
    message: &str,
    timestamp: i64,
    update_head: bool,
) -> Oid {
    let mut index = repo.index().expect("index");
    if let Some(first) = parents.first() {
        let parent_tree = repo
            .find_commit(*first)
            .expect("parent commit")
            .tree()
            .expect("parent tree");
        index.read_tree(&parent_tree).expect("read parent tree");
    } else {
        index.clear().expect("clear index");
    }

    for (path, content) in adds {
        let entry = git2::IndexEntry {
            ctime: git2::IndexTime::new(0, 0),
            mtime: git2::IndexTime::new(0, 0),
            dev: 0,
            ino: 0,
            mode: 0o100644,
            uid: 0,
            gid: 0,
            file_size: content.len() as u32,
            id: Oid::zero(),
            flags: 0,
            flags_extended: 0,
            path: path.as_bytes().to_vec(),
        };
        index.add_frombuffer(&entry, content).expect("stage file");
    }
    for path in removes {
        index
            .remove_path(std::path::Path::new(path))
            .expect("remove path");
    }

    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");
    let sig = Signature::new("Test Author", "test@example.com", &Time::new(timestamp, 0))
        .expect("signature");
    let parent_commits: Vec<_> = parents
        .iter()
        .map(|id| repo.find_commit(*id).expect("find parent"))
        .collect();
    let parent_refs: Vec<_> = parent_commits.iter().collect();

    // libgit2 refuses to advance a ref whose tip is not the first parent
    // (merge fixtures hit this), so HEAD is moved explicitly instead
    let oid = repo
        .commit(None, &sig, &sig, message, &tree, &parent_refs)
        .expect("commit");
    if update_head {
        repo.set_head_detached(oid).expect("set head");
    }
    oid
}

/// Shorthand for a HEAD-advancing commit that only adds files
pub fn commit_files(
    repo: &Repository,
    parents: &[Oid],
    adds: &[(&str, &[u8])],
    message: &str,
    timestamp: i64,
) -> Oid {
    commit(repo, parents, adds, &[], message, timestamp, true)
}
