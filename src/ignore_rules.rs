//! Ignore-rule matching against `.gitignore` files in the HEAD tree
//!
//! Patterns are compiled once per session from the HEAD tree only, never
//! from historical trees: ignore rules are evaluated against present-day
//! conventions even when the candidate blob comes from an old commit.
//!
//! Each `.gitignore` file is compiled into its own matcher scoped to the
//! directory it lives in, so nested rules never leak upward and deeper
//! rules override shallower ones, matching git's resolution order.

use crate::error::Result;
use anyhow::Context;
use git2::{ObjectType, Repository, TreeWalkMode, TreeWalkResult};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// One `.gitignore` file's compiled rules, scoped to its directory
struct IgnoreScope {
    /// Directory prefix the rules apply under ("" for the repository root,
    /// "docs/" for docs/.gitignore)
    prefix: String,
    gitignore: Gitignore,
}

/// Compiled ignore patterns with standard nested-pattern, negation and
/// directory-vs-file semantics
pub struct IgnoreMatcher {
    /// Ordered shallow to deep; later scopes override earlier decisions
    scopes: Vec<IgnoreScope>,
}

impl IgnoreMatcher {
    /// Compile every `.gitignore` blob found in the HEAD tree.
    ///
    /// Repositories without a HEAD commit or without ignore files get an
    /// empty matcher.
    pub fn from_head_tree(repo: &Repository) -> Result<Self> {
        let mut sources: Vec<(String, Vec<u8>)> = Vec::new();

        if let Ok(head) = repo.head()
            && let Ok(commit) = head.peel_to_commit()
            && let Ok(tree) = commit.tree()
        {
            tree.walk(TreeWalkMode::PreOrder, |root, entry| {
                if entry.name() == Some(".gitignore")
                    && entry.kind() == Some(ObjectType::Blob)
                    && let Ok(object) = entry.to_object(repo)
                    && let Some(blob) = object.as_blob()
                {
                    sources.push((root.to_string(), blob.content().to_vec()));
                }
                TreeWalkResult::Ok
            })?;
        }

        // Deeper files are consulted last so their rules win
        sources.sort_by_key(|(prefix, _)| prefix.len());

        let mut scopes = Vec::with_capacity(sources.len());
        let mut patterns = 0u64;
        for (prefix, content) in sources {
            let mut builder = GitignoreBuilder::new("");
            for line in String::from_utf8_lossy(&content).lines() {
                let _ = builder.add_line(None, line);
            }
            let gitignore = builder
                .build()
                .context("Failed to compile ignore patterns from HEAD tree")?;
            patterns += gitignore.num_ignores();
            scopes.push(IgnoreScope { prefix, gitignore });
        }

        tracing::debug!(
            "Compiled {} ignore pattern(s) from {} .gitignore file(s) in HEAD tree",
            patterns,
            scopes.len()
        );

        Ok(Self { scopes })
    }

    /// A matcher that excludes nothing
    pub fn empty() -> Self {
        Self { scopes: Vec::new() }
    }

    /// True if the repository-relative path is excluded by the rules.
    ///
    /// A scope only sees paths under its own directory, relative to that
    /// directory; the deepest scope with an opinion decides.
    pub fn matches(&self, path: &str) -> bool {
        let mut ignored = false;
        for scope in &self.scopes {
            let Some(relative) = path.strip_prefix(scope.prefix.as_str()) else {
                continue;
            };
            let matched = scope
                .gitignore
                .matched_path_or_any_parents(Path::new(relative), false);
            if matched.is_ignore() {
                ignored = true;
            } else if matched.is_whitelist() {
                ignored = false;
            }
        }
        ignored
    }

    pub fn pattern_count(&self) -> u64 {
        self.scopes
            .iter()
            .map(|scope| scope.gitignore.num_ignores())
            .sum()
    }
}
