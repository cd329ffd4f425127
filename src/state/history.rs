//! The edit history engine
//!
//! A linear, persisted log of EditState snapshots per document, with a
//! cursor for undo/redo. The chain is never a tree: committing while the
//! cursor sits behind the tail first discards the redone-over future
//! (branch truncation), so the stored sequence is always one straight
//! line of seq 1..tail.
//!
//! Cursor semantics:
//! - 0 = pristine, no record is displayed
//! - otherwise the seq of the record currently displayed
//! - undo never moves below 1 once a record exists; redo never moves
//!   past the tail

use std::path::Path;

use super::edit::EditState;
use super::store::HistoryStore;
use crate::error::StoreError;

/// Undo/redo log for a single document.
///
/// One log, one cursor, one caller at a time: all mutation goes through
/// `&mut self`, and the store commits truncate+append atomically, which
/// together give the read-modify-write ownership the persistence layer
/// requires.
pub struct HistoryLog {
    store: Box<dyn HistoryStore>,
    document: String,
    cursor: i64,
}

impl HistoryLog {
    /// Derive the history key for an edited file: its base name without
    /// the extension, so "/shoots/day1/IMG_0042.jpg" and a later reopen
    /// of the same file share one log.
    pub fn document_id(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned())
    }

    /// Open the log for a document, creating storage if absent.
    ///
    /// If prior history exists the cursor resumes at the tail record and
    /// its EditState is returned so the session picks up exactly where
    /// the last one left off. Unreadable rows are skipped by the store;
    /// the cursor lands on the last record that decodes.
    pub fn open(
        mut store: Box<dyn HistoryStore>,
        document: impl Into<String>,
    ) -> Result<(Self, Option<EditState>), StoreError> {
        let document = document.into();
        store.prepare(&document)?;

        let records = store.select_all(&document)?;
        let (cursor, resumed) = match records.last() {
            Some(tail) => (tail.seq, Some(tail.state.clone())),
            None => (0, None),
        };

        Ok((
            HistoryLog {
                store,
                document,
                cursor,
            },
            resumed,
        ))
    }

    /// The seq of the record currently displayed (0 = pristine).
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// The document this log is keyed by.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Commit a new snapshot.
    ///
    /// If the cursor is behind the tail (the user undid and then made a
    /// fresh edit), every record past the cursor is discarded first; the
    /// store does the truncate and append as one atomic step. The cursor
    /// advances onto the new record.
    pub fn commit(&mut self, state: &EditState) -> Result<(), StoreError> {
        let seq = self.cursor + 1;
        self.store.commit(&self.document, seq, state)?;
        self.cursor = seq;
        Ok(())
    }

    /// Step the cursor back one record and return the state to apply.
    ///
    /// No-op at the first record (the floor) and in the pristine state.
    /// A corrupt record leaves the cursor where it was and surfaces the
    /// typed error for the caller to decide.
    pub fn undo(&mut self) -> Result<Option<EditState>, StoreError> {
        if self.cursor <= 1 {
            return Ok(None);
        }
        match self.store.select_one(&self.document, self.cursor - 1)? {
            Some(record) => {
                self.cursor = record.seq;
                Ok(Some(record.state))
            }
            None => Ok(None),
        }
    }

    /// Step the cursor forward onto the next record, if one exists, and
    /// return its state. No-op at the tail.
    pub fn redo(&mut self) -> Result<Option<EditState>, StoreError> {
        match self.store.select_next(&self.document, self.cursor)? {
            Some(record) => {
                self.cursor = record.seq;
                Ok(Some(record.state))
            }
            None => Ok(None),
        }
    }

    /// All records in order, primarily for inspection and tests.
    pub fn records(&self) -> Result<Vec<super::store::HistoryRecord>, StoreError> {
        self.store.select_all(&self.document)
    }
}

impl std::fmt::Debug for HistoryLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLog")
            .field("document", &self.document)
            .field("cursor", &self.cursor)
            .finish()
    }
}
