//! Repository access and shape classification

use crate::error::{Result, WalkerError};
use crate::types::RepositoryShape;
use git2::{Oid, Repository};
use std::path::{Path, PathBuf};

/// Read access to a git repository plus its shape, classified once at open time
pub struct RepositoryHandle {
    repo: Repository,
    path: PathBuf,
    shape: RepositoryShape,
}

impl RepositoryHandle {
    /// Open the repository at `path` and classify its shape
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let repo = Repository::open(&path)
            .map_err(|_| WalkerError::RepositoryNotFound(path.display().to_string()))?;

        let shape = classify_shape(&repo);
        tracing::info!(
            "Opened git repository at {} (shape: {:?})",
            path.display(),
            shape
        );

        Ok(Self { repo, path, shape })
    }

    /// Fail fast on shapes the walker cannot traverse faithfully.
    ///
    /// Shallow clones would silently under-count provenance; partial clones
    /// may be missing blob content entirely.
    pub fn validate(&self) -> Result<()> {
        match self.shape {
            RepositoryShape::Shallow => {
                Err(WalkerError::ShallowClone(self.path.display().to_string()))
            }
            RepositoryShape::Partial => {
                Err(WalkerError::PartialClone(self.path.display().to_string()))
            }
            RepositoryShape::Normal | RepositoryShape::Bare => Ok(()),
        }
    }

    pub fn shape(&self) -> RepositoryShape {
        self.shape
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Read the raw bytes of one blob from the object store
    pub fn read_blob(&self, blob_id: &str) -> Result<Vec<u8>> {
        let oid = Oid::from_str(blob_id)?;
        let blob = self.repo.find_blob(oid)?;
        Ok(blob.content().to_vec())
    }
}

fn classify_shape(repo: &Repository) -> RepositoryShape {
    if repo.is_shallow() {
        RepositoryShape::Shallow
    } else if is_partial_clone(repo) {
        RepositoryShape::Partial
    } else if repo.is_bare() {
        RepositoryShape::Bare
    } else {
        RepositoryShape::Normal
    }
}

// Partial clones record a promisor remote in the repository config:
// `extensions.partialClone = <remote>` plus `remote.<remote>.promisor = true`.
fn is_partial_clone(repo: &Repository) -> bool {
    let Ok(config) = repo.config() else {
        return false;
    };
    if config.get_string("extensions.partialclone").is_ok() {
        return true;
    }
    config.get_bool("remote.origin.promisor").unwrap_or(false)
}
