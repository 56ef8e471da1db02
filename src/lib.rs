//! Libris library exports: the lending core and the CLI adapter.

pub mod cli;
pub mod core;

#[cfg(test)]
pub mod test_support;

pub use crate::core::{EntityKind, Library, LibraryError};
pub use crate::core::ids::{IdPrefix, IdentifierGenerator};
pub use crate::core::lending::ReturnReceipt;
pub use crate::core::model::{Book, BorrowRecord, Dataset, LibrarySummary, Member, Timestamp};
pub use crate::core::store::Store;
