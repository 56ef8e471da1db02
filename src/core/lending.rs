//! # Lending
//!
//! The only place where a book and a member change together.
//!
//! ```text
//! borrow(member, book)    member.borrowed.push(record)   book.available -= 1
//! return(member, index)   member.borrowed.remove(index)  book.available += 1 (capped)
//! ```
//!
//! Both operations validate everything before mutating, so a failed call
//! leaves the dataset untouched. Persisting is the caller's job
//! (see `Library`), one save per operation.

use log::{info, warn};

use super::catalog::CatalogMut;
use super::error::LibraryError;
use super::model::{BorrowRecord, Dataset, Timestamp};
use super::roster::RosterMut;

/// What a successful return did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub record: BorrowRecord,
    /// False when the book no longer exists in the catalog; the record is
    /// still cleared so a stale loan never blocks the member.
    pub copy_restored: bool,
}

pub struct LendingService<'a> {
    dataset: &'a mut Dataset,
}

impl<'a> LendingService<'a> {
    pub fn new(dataset: &'a mut Dataset) -> Self {
        Self { dataset }
    }

    pub fn borrow(&mut self, member_id: &str, book_id: &str) -> Result<BorrowRecord, LibraryError> {
        self.borrow_at(member_id, book_id, Timestamp::now())
    }

    /// `borrow` with an explicit event time.
    pub fn borrow_at(
        &mut self,
        member_id: &str,
        book_id: &str,
        now: Timestamp,
    ) -> Result<BorrowRecord, LibraryError> {
        let Dataset { books, members } = &mut *self.dataset;
        let mut roster = RosterMut::new(members);
        let mut catalog = CatalogMut::new(books);

        let member = roster.get_mut(member_id)?;
        let book = catalog.get_mut(book_id)?;

        if book.available_copies == 0 {
            return Err(LibraryError::NoCopiesAvailable {
                book_id: book.id.clone(),
                title: book.title.clone(),
            });
        }

        let record = BorrowRecord {
            book_id: book.id.clone(),
            title: book.title.clone(),
            borrow_on: now,
        };
        member.borrowed.push(record.clone());
        book.available_copies -= 1;

        info!(
            "{} borrowed {} '{}' ({} of {} left)",
            member.id, book.id, book.title, book.available_copies, book.total_copies
        );
        Ok(record)
    }

    /// Clears the member's `record_index`-th loan (0-based, oldest first).
    pub fn return_book(
        &mut self,
        member_id: &str,
        record_index: usize,
    ) -> Result<ReturnReceipt, LibraryError> {
        let Dataset { books, members } = &mut *self.dataset;
        let mut roster = RosterMut::new(members);
        let mut catalog = CatalogMut::new(books);

        let member = roster.get_mut(member_id)?;

        if record_index >= member.borrowed.len() {
            return Err(LibraryError::InvalidIndex {
                member_id: member.id.clone(),
                index: record_index,
                outstanding: member.borrowed.len(),
            });
        }
        let record = member.borrowed.remove(record_index);

        let copy_restored = match catalog.find_mut(&record.book_id) {
            Some(book) => {
                if book.available_copies >= book.total_copies {
                    warn!(
                        "Return of {} would exceed {} total copies; count left at {}",
                        book.id, book.total_copies, book.available_copies
                    );
                } else {
                    book.available_copies += 1;
                }
                info!(
                    "{} returned {} '{}' ({} of {} on shelf)",
                    member.id, book.id, record.title, book.available_copies, book.total_copies
                );
                true
            }
            None => {
                warn!(
                    "{} returned {} '{}' but the book is no longer catalogued",
                    member.id, record.book_id, record.title
                );
                false
            }
        };

        Ok(ReturnReceipt {
            record,
            copy_restored,
        })
    }
}
