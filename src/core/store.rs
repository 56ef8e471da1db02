//! # Store
//!
//! Whole-document persistence: `load` reads the JSON file into a `Dataset`,
//! `save` writes the entire dataset back. There are no partial writes.
//!
//! ```text
//! load:  missing file    -> write and return an empty dataset
//!        blank file      -> empty dataset, file left as is
//!        malformed file  -> copy to `<file>.bak`, empty dataset
//!        valid file      -> dataset, availability counts reconciled
//! save:  `<file>.tmp` + rename, so a crash never leaves half a document
//! ```
//!
//! Single writer only. There is no lock and no version stamp: two processes
//! that each load, mutate and save will silently lose one side's changes.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use super::error::LibraryError;
use super::model::Dataset;

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where a malformed document is copied before it can be overwritten.
    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, ".bak")
    }

    pub fn load(&self) -> Result<Dataset, LibraryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No library file at {}, creating an empty one", self.path.display());
                let empty = Dataset::new();
                self.save(&empty)?;
                return Ok(empty);
            }
            Err(e) => return Err(LibraryError::persistence("read", &self.path, e)),
        };

        if raw.trim().is_empty() {
            warn!("Library file {} is empty, starting with no data", self.path.display());
            return Ok(Dataset::new());
        }

        let mut data: Dataset = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    "Library file {} is malformed ({}), starting with no data",
                    self.path.display(),
                    e
                );
                self.preserve_unreadable()?;
                return Ok(Dataset::new());
            }
        };

        for fixed in data.reconcile_availability() {
            warn!(
                "Book {} had {} of {} copies available with {} on loan; reset to {}",
                fixed.book_id,
                fixed.available_copies,
                fixed.total_copies,
                fixed.outstanding,
                fixed.expected_available()
            );
        }

        debug!(
            "Loaded {} books and {} members from {}",
            data.books.len(),
            data.members.len(),
            self.path.display()
        );
        Ok(data)
    }

    pub fn save(&self, data: &Dataset) -> Result<(), LibraryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| LibraryError::persistence("create directory for", &self.path, e))?;
        }
        atomic_write_json(&self.path, data)
            .map_err(|e| LibraryError::persistence("write", &self.path, e))?;
        debug!(
            "Saved {} books and {} members to {}",
            data.books.len(),
            data.members.len(),
            self.path.display()
        );
        Ok(())
    }

    fn preserve_unreadable(&self) -> Result<(), LibraryError> {
        let backup = self.backup_path();
        fs::copy(&self.path, &backup)
            .map_err(|e| LibraryError::persistence("back up", &self.path, e))?;
        warn!("Copied unreadable library file to {}", backup.display());
        Ok(())
    }
}

/// `library.json` + `.tmp` -> `library.json.tmp`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let tmp_path = with_suffix(path, ".tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}
