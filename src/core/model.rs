//! # Data Model
//!
//! The whole library lives in one `Dataset`, which is exactly what gets
//! written to disk.
//!
//! ```text
//! Dataset
//! ├── books: Vec<Book>
//! │   └── id, title, author, total_copies, available_copies, added_on
//! └── members: Vec<Member>
//!     └── id, name, email, borrowed: Vec<BorrowRecord>
//!                                    └── book_id, title (snapshot), borrow_on
//! ```
//!
//! Availability invariant, for every book:
//! `available_copies == total_copies - (borrow records naming this book)`.
//! `BorrowRecord::title` is a snapshot taken at borrow time and is never
//! refreshed from the catalog.

use std::collections::HashMap;
use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::LibraryError;

/// On-disk format for every timestamp in the document.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock time with whole-second precision, so a value survives a
/// format/parse round trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self::from_naive(Local::now().naive_local())
    }

    pub fn from_naive(dt: NaiveDateTime) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).map(Self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub total_copies: u32,
    pub available_copies: u32,
    /// Older documents may lack it; absent stays absent on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_on: Option<Timestamp>,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// One outstanding loan, embedded in the borrowing member.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BorrowRecord {
    pub book_id: String,
    pub title: String,
    pub borrow_on: Timestamp,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Oldest loan first. Only `LendingService` mutates this.
    #[serde(default)]
    pub borrowed: Vec<BorrowRecord>,
}

impl Member {
    pub fn borrowed_count(&self) -> usize {
        self.borrowed.len()
    }
}

/// A book whose counts break the availability invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityViolation {
    pub book_id: String,
    pub total_copies: u32,
    pub available_copies: u32,
    pub outstanding: usize,
}

impl AvailabilityViolation {
    /// The count the book should have, clamped to `[0, total_copies]`.
    pub fn expected_available(&self) -> u32 {
        let outstanding = u32::try_from(self.outstanding).unwrap_or(u32::MAX);
        self.total_copies.saturating_sub(outstanding)
    }
}

/// Headline numbers for a dashboard.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibrarySummary {
    pub titles: usize,
    pub members: usize,
    pub total_copies: u64,
    pub available_copies: u64,
    pub outstanding_loans: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow records across all members that name `book_id`.
    pub fn outstanding_loans(&self, book_id: &str) -> usize {
        self.members
            .iter()
            .flat_map(|m| m.borrowed.iter())
            .filter(|r| r.book_id == book_id)
            .count()
    }

    fn outstanding_by_book(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for record in self.members.iter().flat_map(|m| m.borrowed.iter()) {
            *counts.entry(record.book_id.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Every book whose available count disagrees with its outstanding records.
    pub fn availability_violations(&self) -> Vec<AvailabilityViolation> {
        let counts = self.outstanding_by_book();
        self.books
            .iter()
            .filter_map(|book| {
                let outstanding = counts.get(book.id.as_str()).copied().unwrap_or(0);
                let violation = AvailabilityViolation {
                    book_id: book.id.clone(),
                    total_copies: book.total_copies,
                    available_copies: book.available_copies,
                    outstanding,
                };
                let consistent = book.available_copies <= book.total_copies
                    && u64::from(book.available_copies) + outstanding as u64
                        == u64::from(book.total_copies);
                (!consistent).then_some(violation)
            })
            .collect()
    }

    /// Rewrites available counts from the borrow records. Returns what was fixed.
    pub fn reconcile_availability(&mut self) -> Vec<AvailabilityViolation> {
        let violations = self.availability_violations();
        for violation in &violations {
            if let Some(book) = self.books.iter_mut().find(|b| b.id == violation.book_id) {
                book.available_copies = violation.expected_available();
            }
        }
        violations
    }

    pub fn summary(&self) -> LibrarySummary {
        LibrarySummary {
            titles: self.books.len(),
            members: self.members.len(),
            total_copies: self.books.iter().map(|b| u64::from(b.total_copies)).sum(),
            available_copies: self.books.iter().map(|b| u64::from(b.available_copies)).sum(),
            outstanding_loans: self.members.iter().map(Member::borrowed_count).sum(),
        }
    }

    /// The `limit` most recently added books, newest first. Books added in
    /// the same second keep insertion order; undated books come last.
    pub fn recent_books(&self, limit: usize) -> Vec<&Book> {
        let mut books: Vec<&Book> = self.books.iter().collect();
        books.sort_by(|a, b| b.added_on.cmp(&a.added_on));
        books.truncate(limit);
        books
    }
}

/// Trims `value` and rejects it if nothing is left.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, LibraryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LibraryError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Case-insensitive substring match of `query` against any of `fields`.
/// A blank query matches everything.
pub(crate) fn text_matches(query: &str, fields: &[&str]) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{book, member, record};

    #[test]
    fn test_timestamp_serializes_in_fixed_format() {
        let ts = Timestamp::parse("2024-03-01 09:05:07").unwrap();
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2024-03-01 09:05:07\"");
        let back: Timestamp = serde_json::from_str("\"2024-03-01 09:05:07\"").unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn test_timestamp_now_has_no_subseconds() {
        let now = Timestamp::now();
        assert_eq!(now.0.nanosecond(), 0);
        assert_eq!(Timestamp::parse(&now.to_string()).unwrap(), now);
    }

    #[test]
    fn test_timestamp_rejects_other_formats() {
        assert!(serde_json::from_str::<Timestamp>("\"2024-03-01T09:05:07Z\"").is_err());
    }

    #[test]
    fn test_member_without_borrowed_key_loads_empty() {
        let json = r#"{"id":"M_AAAAA","name":"Ann","email":"ann@x.com"}"#;
        let m: Member = serde_json::from_str(json).unwrap();
        assert!(m.borrowed.is_empty());
    }

    #[test]
    fn test_dataset_missing_keys_default_to_empty() {
        let data: Dataset = serde_json::from_str("{}").unwrap();
        assert_eq!(data, Dataset::new());
    }

    #[test]
    fn test_outstanding_loans_counts_across_members() {
        let mut a = member("M_AAAAA");
        a.borrowed.push(record("B_11111"));
        a.borrowed.push(record("B_22222"));
        let mut b = member("M_BBBBB");
        b.borrowed.push(record("B_11111"));
        let data = Dataset {
            books: vec![book("B_11111", 3, 1), book("B_22222", 1, 0)],
            members: vec![a, b],
        };
        assert_eq!(data.outstanding_loans("B_11111"), 2);
        assert_eq!(data.outstanding_loans("B_22222"), 1);
        assert!(data.availability_violations().is_empty());
    }

    #[test]
    fn test_reconcile_repairs_drifted_counts() {
        let mut m = member("M_AAAAA");
        m.borrowed.push(record("B_11111"));
        let mut data = Dataset {
            books: vec![book("B_11111", 2, 2), book("B_22222", 2, 5)],
            members: vec![m],
        };
        let fixed = data.reconcile_availability();
        assert_eq!(fixed.len(), 2);
        assert_eq!(data.books[0].available_copies, 1);
        assert_eq!(data.books[1].available_copies, 2);
        assert!(data.availability_violations().is_empty());
    }

    #[test]
    fn test_reconcile_clamps_overlent_book_to_zero() {
        let mut a = member("M_AAAAA");
        a.borrowed.push(record("B_11111"));
        a.borrowed.push(record("B_11111"));
        let mut data = Dataset {
            books: vec![book("B_11111", 1, 0)],
            members: vec![a],
        };
        data.reconcile_availability();
        assert_eq!(data.books[0].available_copies, 0);
    }

    #[test]
    fn test_summary_totals() {
        let mut m = member("M_AAAAA");
        m.borrowed.push(record("B_11111"));
        let data = Dataset {
            books: vec![book("B_11111", 3, 2), book("B_22222", 4, 4)],
            members: vec![m, member("M_BBBBB")],
        };
        let s = data.summary();
        assert_eq!(s.titles, 2);
        assert_eq!(s.members, 2);
        assert_eq!(s.total_copies, 7);
        assert_eq!(s.available_copies, 6);
        assert_eq!(s.outstanding_loans, 1);
    }

    #[test]
    fn test_required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("title", "  Dune ").unwrap(), "Dune");
        assert!(matches!(
            required_text("title", "   "),
            Err(LibraryError::Validation(_))
        ));
    }

    #[test]
    fn test_text_matches_is_case_insensitive() {
        assert!(text_matches("HERB", &["Dune", "Frank Herbert"]));
        assert!(text_matches("", &["anything"]));
        assert!(!text_matches("asimov", &["Dune", "Frank Herbert"]));
    }

    #[test]
    fn test_recent_books_newest_first() {
        let mut old = book("B_OLD00", 1, 1);
        old.added_on = Timestamp::parse("2023-01-01 00:00:00").ok();
        let mut new = book("B_NEW00", 1, 1);
        new.added_on = Timestamp::parse("2024-01-01 00:00:00").ok();
        let mut mid = book("B_MID00", 1, 1);
        mid.added_on = Timestamp::parse("2023-06-01 00:00:00").ok();
        let data = Dataset {
            books: vec![old, new, mid],
            members: vec![],
        };
        let ids: Vec<&str> = data.recent_books(2).iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["B_NEW00", "B_MID00"]);
    }

    #[test]
    fn test_recent_books_ties_keep_insertion_order() {
        let mut undated = book("B_UNDAT", 1, 1);
        undated.added_on = None;
        let data = Dataset {
            books: vec![
                undated,
                book("B_FIRST", 1, 1),
                book("B_SECND", 1, 1),
                book("B_THIRD", 1, 1),
            ],
            members: vec![],
        };
        let ids: Vec<&str> = data.recent_books(10).iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["B_FIRST", "B_SECND", "B_THIRD", "B_UNDAT"]);
    }

    #[test]
    fn test_book_without_added_on_still_parses() {
        let json = r#"{"id": "B_AAAAA", "title": "Dune", "author": "Herbert",
                       "total_copies": 2, "available_copies": 2}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.added_on, None);
        let back = serde_json::to_value(&book).unwrap();
        assert!(back.get("added_on").is_none());
    }
}
