//! # Lending Inventory Core
//!
//! Libris's business logic. It knows nothing about any specific UI.
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │          CORE            │
//!                    │  (this module)           │
//!                    │                          │
//!                    │  • Library (entry point) │
//!                    │  • Catalog / Roster      │
//!                    │  • LendingService        │
//!                    │  • Store (JSON document) │
//!                    └────────────┬─────────────┘
//!                                 │
//!            ┌────────────────────┼────────────────────┐
//!            ▼                    ▼                    ▼
//!     ┌────────────┐       ┌────────────┐       ┌────────────┐
//!     │    CLI     │       │ Dashboard  │       │   Tests    │
//!     │  (clap)    │       │  (future)  │       │            │
//!     └────────────┘       └────────────┘       └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`model`]: `Book`, `Member`, `BorrowRecord`, `Dataset`
//! - [`ids`]: `B_XXXXX` / `M_XXXXX` identifiers
//! - [`store`]: load and save the whole dataset
//! - [`catalog`], [`roster`]: the two collections
//! - [`lending`]: borrow and return
//! - [`library`]: ties the above together and saves after each change
//! - [`config`]: settings file and overrides

pub mod catalog;
pub mod config;
pub mod error;
pub mod ids;
pub mod lending;
pub mod library;
pub mod model;
pub mod roster;
pub mod store;

pub use error::{EntityKind, LibraryError};
pub use library::Library;
