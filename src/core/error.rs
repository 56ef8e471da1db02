//! # Errors
//!
//! Every core operation fails with a `LibraryError`. All variants are
//! recoverable at the operation boundary: the caller reports them and the
//! in-memory dataset is left as it was before the operation started.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Which kind of record a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Book,
    Member,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Book => write!(f, "book"),
            EntityKind::Member => write!(f, "member"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// Empty or otherwise unusable input. Nothing was changed.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("no copies of '{title}' ({book_id}) are available")]
    NoCopiesAvailable { book_id: String, title: String },

    #[error("member {member_id} has no borrow record #{index} ({outstanding} outstanding)")]
    InvalidIndex {
        member_id: String,
        index: usize,
        outstanding: usize,
    },

    /// The durable document could not be read or written. Memory and disk
    /// may disagree until the next successful save.
    #[error("failed to {action} {}: {source}", path.display())]
    Persistence {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not find a free {prefix}_ identifier after {attempts} attempts")]
    IdSpaceExhausted { prefix: &'static str, attempts: u32 },
}

impl LibraryError {
    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        LibraryError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn persistence(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        LibraryError::Persistence {
            action,
            path: path.into(),
            source,
        }
    }

    /// True for failures that put unsaved changes at risk. Callers should
    /// surface these loudly instead of folding them into a status line.
    pub fn is_persistence(&self) -> bool {
        matches!(self, LibraryError::Persistence { .. })
    }
}
