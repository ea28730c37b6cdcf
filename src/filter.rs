//! Content filter pipeline
//!
//! An ordered, short-circuiting list of predicates over raw blob bytes.
//! Each predicate is independently testable; the session composes the
//! pipeline once from its options and evaluates it once per distinct blob.

use crate::error::WalkErrorKind;
use crate::options::WalkOptions;

/// Pointer files written by git-lfs begin with this line
pub const LFS_POINTER_SIGNATURE: &[u8] = b"version https://git-lfs.github.com/spec/v1";

/// Binary detection only inspects this many leading bytes
pub const BINARY_SCAN_LIMIT: usize = 8000;

/// One independent predicate over blob content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPredicate {
    /// Reject blobs larger than `limit` bytes
    MaxSize { limit: usize },
    /// Skip blobs containing a NUL byte within the first `scan_limit` bytes
    Binary { scan_limit: usize },
    /// Reject git-lfs pointer files; the real content lives elsewhere
    LfsPointer,
    /// Reject content that is not valid UTF-8 text
    Utf8Text,
}

/// Outcome of evaluating a predicate (or the whole pipeline)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVerdict {
    Keep,
    /// Routine exclusion; counted but never recorded as an error
    Skip,
    /// Exclusion recorded as a per-item walk error
    Reject { kind: WalkErrorKind, message: String },
}

impl FilterPredicate {
    pub fn evaluate(&self, content: &[u8]) -> FilterVerdict {
        match self {
            FilterPredicate::MaxSize { limit } => {
                if content.len() > *limit {
                    FilterVerdict::Reject {
                        kind: WalkErrorKind::OversizedBlob,
                        message: format!(
                            "blob size {} exceeds maximum {}",
                            content.len(),
                            limit
                        ),
                    }
                } else {
                    FilterVerdict::Keep
                }
            }
            FilterPredicate::Binary { scan_limit } => {
                let scan = &content[..content.len().min(*scan_limit)];
                if scan.contains(&0) {
                    // Binary exclusion is routine, not exceptional
                    FilterVerdict::Skip
                } else {
                    FilterVerdict::Keep
                }
            }
            FilterPredicate::LfsPointer => {
                if content.starts_with(LFS_POINTER_SIGNATURE) {
                    FilterVerdict::Reject {
                        kind: WalkErrorKind::LfsPointer,
                        message: "git-lfs pointer file; actual content is stored externally"
                            .to_string(),
                    }
                } else {
                    FilterVerdict::Keep
                }
            }
            FilterPredicate::Utf8Text => match std::str::from_utf8(content) {
                Ok(_) => FilterVerdict::Keep,
                Err(err) => FilterVerdict::Reject {
                    kind: WalkErrorKind::InvalidEncoding,
                    message: format!("content is not valid UTF-8: {err}"),
                },
            },
        }
    }
}

/// Ordered pipeline of predicates, evaluated with short-circuiting
pub struct ContentFilter {
    predicates: Vec<FilterPredicate>,
}

impl ContentFilter {
    pub fn new(predicates: Vec<FilterPredicate>) -> Self {
        Self { predicates }
    }

    /// Standard pipeline: size, binary, lfs pointer, encoding
    pub fn from_options(options: &WalkOptions) -> Self {
        let mut predicates = vec![FilterPredicate::MaxSize {
            limit: options.max_blob_size,
        }];
        if options.skip_binary {
            predicates.push(FilterPredicate::Binary {
                scan_limit: BINARY_SCAN_LIMIT,
            });
        }
        predicates.push(FilterPredicate::LfsPointer);
        predicates.push(FilterPredicate::Utf8Text);
        Self::new(predicates)
    }

    /// First non-`Keep` verdict wins
    pub fn evaluate(&self, content: &[u8]) -> FilterVerdict {
        for predicate in &self.predicates {
            let verdict = predicate.evaluate(content);
            if verdict != FilterVerdict::Keep {
                return verdict;
            }
        }
        FilterVerdict::Keep
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
