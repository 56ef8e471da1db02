//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::model::{Book, BorrowRecord, Member, Timestamp};

/// Fixed time so fixtures compare equal across runs.
pub fn fixed_time() -> Timestamp {
    Timestamp::parse("2024-01-15 12:30:00").expect("fixture timestamp")
}

/// A book with hand-picked counts. Counts are not checked against loans.
pub fn book(id: &str, total: u32, available: u32) -> Book {
    Book {
        id: id.to_string(),
        title: format!("Title of {id}"),
        author: "Test Author".to_string(),
        total_copies: total,
        available_copies: available,
        added_on: Some(fixed_time()),
    }
}

pub fn member(id: &str) -> Member {
    Member {
        id: id.to_string(),
        name: format!("Member {id}"),
        email: format!("{}@example.com", id.to_lowercase()),
        borrowed: Vec::new(),
    }
}

pub fn record(book_id: &str) -> BorrowRecord {
    BorrowRecord {
        book_id: book_id.to_string(),
        title: format!("Title of {book_id}"),
        borrow_on: fixed_time(),
    }
}
