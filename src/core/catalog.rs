//! # Catalog
//!
//! The book collection. Adds, lookups and searches; no edits or deletes.
//! Nothing here touches the disk; the caller commits after `add`.
//!
//! `Catalog` is the shared view the facade reads through, `CatalogMut` the
//! handle mutations go through.

use log::{debug, info};

use super::error::{EntityKind, LibraryError};
use super::ids::{IdPrefix, IdentifierGenerator};
use super::model::{Book, Timestamp, required_text, text_matches};

#[derive(Clone, Copy)]
pub struct Catalog<'a> {
    books: &'a [Book],
}

impl<'a> Catalog<'a> {
    pub fn new(books: &'a [Book]) -> Self {
        Self { books }
    }

    /// Linear scan by id.
    pub fn find(&self, id: &str) -> Option<&'a Book> {
        let found = self.books.iter().find(|b| b.id == id);
        if found.is_none() {
            debug!("Book lookup missed: {}", id);
        }
        found
    }

    /// All books in insertion order, or those whose title or author
    /// contains `filter` (any case).
    pub fn list(&self, filter: Option<&str>) -> Vec<&'a Book> {
        match filter {
            Some(query) => self
                .books
                .iter()
                .filter(|b| text_matches(query, &[b.title.as_str(), b.author.as_str()]))
                .collect(),
            None => self.books.iter().collect(),
        }
    }

    /// Books with at least one copy on the shelf.
    pub fn available(&self) -> Vec<&'a Book> {
        self.books.iter().filter(|b| b.is_available()).collect()
    }
}

pub struct CatalogMut<'a> {
    books: &'a mut Vec<Book>,
}

impl<'a> CatalogMut<'a> {
    pub fn new(books: &'a mut Vec<Book>) -> Self {
        Self { books }
    }

    /// Appends a new book with every copy on the shelf.
    pub fn add(
        &mut self,
        ids: &mut IdentifierGenerator,
        title: &str,
        author: &str,
        copies: i64,
    ) -> Result<Book, LibraryError> {
        let title = required_text("title", title)?;
        let author = required_text("author", author)?;
        if copies <= 0 {
            return Err(LibraryError::Validation(format!(
                "copies must be positive, got {copies}"
            )));
        }
        let copies = u32::try_from(copies).map_err(|_| {
            LibraryError::Validation(format!("copies must be at most {}, got {copies}", u32::MAX))
        })?;

        let id = ids.generate_unique(IdPrefix::Book, |candidate| {
            self.books.iter().any(|b| b.id == candidate)
        })?;

        let book = Book {
            id,
            title,
            author,
            total_copies: copies,
            available_copies: copies,
            added_on: Some(Timestamp::now()),
        };
        info!("Added book {} '{}' ({} copies)", book.id, book.title, copies);
        self.books.push(book.clone());
        Ok(book)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Book> {
        let found = self.books.iter_mut().find(|b| b.id == id);
        if found.is_none() {
            debug!("Book lookup missed: {}", id);
        }
        found
    }

    /// Like `find_mut`, but a miss is a `NotFound` error.
    pub fn get_mut(&mut self, id: &str) -> Result<&mut Book, LibraryError> {
        self.find_mut(id)
            .ok_or_else(|| LibraryError::not_found(EntityKind::Book, id))
    }
}
