//! # Library
//!
//! The entry point a presentation layer talks to. Owns the `Store`, the
//! loaded `Dataset` and the id generator, and commits after every mutation:
//!
//! ```text
//! snapshot -> mutate (Catalog / Roster / LendingService) -> Store::save
//!                                                             │
//!                                     save failed: restore snapshot, return error
//! ```
//!
//! Memory and disk therefore agree after every call, whether it succeeded
//! or not.

use log::error;

use super::catalog::{Catalog, CatalogMut};
use super::error::LibraryError;
use super::ids::IdentifierGenerator;
use super::lending::{LendingService, ReturnReceipt};
use super::model::{Book, BorrowRecord, Dataset, LibrarySummary, Member};
use super::roster::{Roster, RosterMut};
use super::store::Store;

#[derive(Debug)]
pub struct Library {
    store: Store,
    dataset: Dataset,
    ids: IdentifierGenerator,
}

impl Library {
    /// Loads the store once; everything after works on the in-memory copy.
    pub fn open(store: Store) -> Result<Self, LibraryError> {
        Self::open_with(store, IdentifierGenerator::new())
    }

    pub fn open_with(store: Store, ids: IdentifierGenerator) -> Result<Self, LibraryError> {
        let dataset = store.load()?;
        Ok(Self {
            store,
            dataset,
            ids,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    // ── Books ──────────────────────────────────────────────────────────────

    pub fn add_book(&mut self, title: &str, author: &str, copies: i64) -> Result<Book, LibraryError> {
        self.commit(|data, ids| CatalogMut::new(&mut data.books).add(ids, title, author, copies))
    }

    pub fn list_books(&self, filter: Option<&str>) -> Vec<&Book> {
        Catalog::new(&self.dataset.books).list(filter)
    }

    pub fn find_book(&self, id: &str) -> Option<&Book> {
        Catalog::new(&self.dataset.books).find(id)
    }

    /// Books a member could borrow right now.
    pub fn borrowable_books(&self) -> Vec<&Book> {
        Catalog::new(&self.dataset.books).available()
    }

    // ── Members ────────────────────────────────────────────────────────────

    pub fn add_member(&mut self, name: &str, email: &str) -> Result<Member, LibraryError> {
        self.commit(|data, ids| RosterMut::new(&mut data.members).add(ids, name, email))
    }

    pub fn list_members(&self, filter: Option<&str>) -> Vec<&Member> {
        Roster::new(&self.dataset.members).list(filter)
    }

    pub fn find_member(&self, id: &str) -> Option<&Member> {
        Roster::new(&self.dataset.members).find(id)
    }

    // ── Lending ────────────────────────────────────────────────────────────

    pub fn borrow(&mut self, member_id: &str, book_id: &str) -> Result<BorrowRecord, LibraryError> {
        self.commit(|data, _| LendingService::new(data).borrow(member_id, book_id))
    }

    /// `record_index` is 0-based into the member's loans, oldest first.
    pub fn return_book(
        &mut self,
        member_id: &str,
        record_index: usize,
    ) -> Result<ReturnReceipt, LibraryError> {
        self.commit(|data, _| LendingService::new(data).return_book(member_id, record_index))
    }

    // ── Views ──────────────────────────────────────────────────────────────

    pub fn summary(&self) -> LibrarySummary {
        self.dataset.summary()
    }

    pub fn recent_books(&self, limit: usize) -> Vec<&Book> {
        self.dataset.recent_books(limit)
    }

    /// The document exactly as `save` would write it.
    pub fn export_json(&self) -> Result<String, LibraryError> {
        serde_json::to_string_pretty(&self.dataset).map_err(|e| {
            LibraryError::persistence(
                "serialize",
                self.store.path(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    fn commit<T, F>(&mut self, op: F) -> Result<T, LibraryError>
    where
        F: FnOnce(&mut Dataset, &mut IdentifierGenerator) -> Result<T, LibraryError>,
    {
        let snapshot = self.dataset.clone();
        let out = op(&mut self.dataset, &mut self.ids)?;
        if let Err(e) = self.store.save(&self.dataset) {
            error!("Save failed, discarding unsaved change: {}", e);
            self.dataset = snapshot;
            return Err(e);
        }
        Ok(out)
    }
}
