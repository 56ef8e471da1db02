//! # CLI Adapter
//!
//! The presentation layer: turns subcommands into `Library` calls and
//! renders the results. This is the only module that writes to stdout.
//!
//! Borrow records are numbered from 1 here, the way a person counts them;
//! the core indexes from 0.

pub mod table;

use std::io::{self, Write};

use clap::Subcommand;
use log::debug;

use crate::core::config::ResolvedConfig;
use crate::core::error::{EntityKind, LibraryError};
use crate::core::library::Library;
use crate::core::model::{Book, Member};
use table::Table;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a book to the catalog
    AddBook {
        title: String,
        author: String,
        #[arg(allow_negative_numbers = true)]
        copies: i64,
    },
    /// List books, optionally filtered by title or author
    Books {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Register a member
    AddMember { name: String, email: String },
    /// List members, optionally filtered by name or email
    Members {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Lend a copy of a book to a member
    Borrow { member_id: String, book_id: String },
    /// Give back a member's loan, numbered as shown by `loans`
    Return { member_id: String, record_no: usize },
    /// Show a member's outstanding loans
    Loans { member_id: String },
    /// Totals and most recently added books
    Stats,
    /// Print the raw library document
    Dump,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error("output error: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    /// Persistence failures mean data may not be on disk; callers should
    /// make those stand out.
    pub fn is_persistence(&self) -> bool {
        matches!(self, CliError::Library(e) if e.is_persistence())
    }
}

pub fn run<W: Write>(
    library: &mut Library,
    command: Command,
    config: &ResolvedConfig,
    out: &mut W,
) -> Result<(), CliError> {
    debug!("Running command: {:?}", command);
    match command {
        Command::AddBook {
            title,
            author,
            copies,
        } => {
            let book = library.add_book(&title, &author, copies)?;
            writeln!(
                out,
                "Added book {} '{}' by {} ({} copies)",
                book.id, book.title, book.author, book.total_copies
            )?;
        }
        Command::Books { search } => {
            let books = library.list_books(search.as_deref());
            if books.is_empty() {
                writeln!(out, "No books found.")?;
            } else {
                books_table(&books).render(out)?;
            }
        }
        Command::AddMember { name, email } => {
            let member = library.add_member(&name, &email)?;
            writeln!(out, "Added member {} '{}' <{}>", member.id, member.name, member.email)?;
        }
        Command::Members { search } => {
            let members = library.list_members(search.as_deref());
            if members.is_empty() {
                writeln!(out, "No members found.")?;
            } else {
                members_table(&members).render(out)?;
            }
        }
        Command::Borrow { member_id, book_id } => {
            let record = library.borrow(&member_id, &book_id)?;
            let left = library
                .find_book(&record.book_id)
                .map(|b| b.available_copies)
                .unwrap_or(0);
            writeln!(
                out,
                "'{}' borrowed by {} ({} copies left)",
                record.title, member_id, left
            )?;
        }
        Command::Return {
            member_id,
            record_no,
        } => {
            let index = record_no.checked_sub(1).ok_or_else(|| {
                LibraryError::Validation("record numbers start at 1".to_string())
            })?;
            let receipt = library.return_book(&member_id, index)?;
            if receipt.copy_restored {
                writeln!(out, "Returned '{}'.", receipt.record.title)?;
            } else {
                writeln!(
                    out,
                    "Returned '{}' ({} is no longer in the catalog).",
                    receipt.record.title, receipt.record.book_id
                )?;
            }
        }
        Command::Loans { member_id } => {
            let member = library
                .find_member(&member_id)
                .ok_or_else(|| LibraryError::not_found(EntityKind::Member, &member_id))?;
            if member.borrowed.is_empty() {
                writeln!(out, "{} has no borrowed books.", member.name)?;
            } else {
                let mut table = Table::new(["#", "Book", "Title", "Borrowed On"]);
                for (i, record) in member.borrowed.iter().enumerate() {
                    table.row([
                        (i + 1).to_string(),
                        record.book_id.clone(),
                        record.title.clone(),
                        record.borrow_on.to_string(),
                    ]);
                }
                table.render(out)?;
            }
        }
        Command::Stats => {
            let s = library.summary();
            writeln!(out, "Titles:            {}", s.titles)?;
            writeln!(out, "Members:           {}", s.members)?;
            writeln!(out, "Total copies:      {}", s.total_copies)?;
            writeln!(out, "Available copies:  {}", s.available_copies)?;
            writeln!(out, "Outstanding loans: {}", s.outstanding_loans)?;
            let recent = library.recent_books(config.recent_books);
            if !recent.is_empty() {
                writeln!(out)?;
                writeln!(out, "Recent books:")?;
                books_table(&recent).render(out)?;
            }
        }
        Command::Dump => {
            writeln!(out, "{}", library.export_json()?)?;
        }
    }
    Ok(())
}

fn books_table(books: &[&Book]) -> Table {
    let mut table = Table::new(["ID", "Title", "Author", "Total", "Available", "Added On"]);
    for b in books {
        table.row([
            b.id.clone(),
            b.title.clone(),
            b.author.clone(),
            b.total_copies.to_string(),
            b.available_copies.to_string(),
            b.added_on.map(|t| t.to_string()).unwrap_or_default(),
        ]);
    }
    table
}

fn members_table(members: &[&Member]) -> Table {
    let mut table = Table::new(["ID", "Name", "Email", "Borrowed"]);
    for m in members {
        table.row([
            m.id.clone(),
            m.name.clone(),
            m.email.clone(),
            m.borrowed_count().to_string(),
        ]);
    }
    table
}
