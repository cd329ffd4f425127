//! Persistence backing for the edit history
//!
//! History is a table of `(document, seq) -> EditState` rows. The
//! [`HistoryStore`] trait is the complete contract the history engine
//! needs: prepare, append, truncate-at-or-above, select-all, select-one,
//! select-next, plus an atomic commit combining truncate and append.
//! Anything satisfying it can back the log; this module ships the SQLite
//! catalog used in production and an in-memory fallback used when the
//! database cannot be opened (and as the test double).
//!
//! All SQL is parameterized; document identity is a column value, never
//! interpolated into statement text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::Connection;

use super::edit::EditState;
use crate::error::StoreError;

/// One persisted history row: a sequence number and the full parameter
/// snapshot committed at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Monotonic position in the document's history, starting at 1
    pub seq: i64,
    /// The committed parameters
    pub state: EditState,
}

/// The persistence contract for edit history, keyed `(document, seq)`.
pub trait HistoryStore {
    /// Create the backing table/bucket for a document if absent.
    /// Idempotent; called once when a log is opened.
    fn prepare(&mut self, document: &str) -> Result<(), StoreError>;

    /// Insert a new row at `seq`.
    fn append(&mut self, document: &str, seq: i64, state: &EditState) -> Result<(), StoreError>;

    /// Delete every row with sequence number >= `seq` (branch truncation).
    fn truncate_from(&mut self, document: &str, seq: i64) -> Result<(), StoreError>;

    /// Truncate at `seq` and append the new row there, as one atomic
    /// step: either both happen or neither does.
    fn commit(&mut self, document: &str, seq: i64, state: &EditState) -> Result<(), StoreError> {
        self.truncate_from(document, seq)?;
        self.append(document, seq, state)
    }

    /// All rows for a document in ascending sequence order. Rows that
    /// fail to decode are skipped with a warning; resume should not die
    /// on one bad record.
    fn select_all(&self, document: &str) -> Result<Vec<HistoryRecord>, StoreError>;

    /// The row at exactly `seq`, if any.
    fn select_one(&self, document: &str, seq: i64) -> Result<Option<HistoryRecord>, StoreError>;

    /// The first row after `seq`, if any.
    fn select_next(&self, document: &str, seq: i64) -> Result<Option<HistoryRecord>, StoreError>;
}

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

/// SQLite-backed history store.
///
/// The database file lives in the user's data directory:
/// - Linux: ~/.local/share/photo-editor-core/edit_history.db
/// - macOS: ~/Library/Application Support/photo-editor-core/edit_history.db
/// - Windows: %APPDATA%\photo-editor-core\edit_history.db
pub struct SqliteStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

/// Column list shared by every SELECT, in decode order.
const COLUMNS: &str = "seq, rotation, horizontal_flip, vertical_flip, \
     brightness, contrast, sharpness, \
     crop_left, crop_right, crop_top, crop_bottom, filter, blur";

impl SqliteStore {
    /// Open (or create) the history database at the default location.
    pub fn open_default() -> Result<Self, StoreError> {
        let db_path = Self::default_db_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&db_path)?;
        println!("📁 History database initialized at: {}", db_path.display());
        Ok(SqliteStore {
            conn,
            db_path: Some(db_path),
        })
    }

    /// Open a history database at an explicit path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path)?;
        Ok(SqliteStore {
            conn,
            db_path: Some(db_path),
        })
    }

    /// Purely in-memory database; history lasts for the process only.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(SqliteStore {
            conn: Connection::open_in_memory()?,
            db_path: None,
        })
    }

    fn default_db_path() -> Result<PathBuf, StoreError> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StoreError::NoDataDir)?;
        path.push("photo-editor-core");
        path.push("edit_history.db");
        Ok(path)
    }

    /// Path to the database file (None for in-memory stores)
    pub fn path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    fn select_where(
        &self,
        clause: &str,
        params: impl rusqlite::Params,
        document: &str,
    ) -> Result<Vec<HistoryRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM history WHERE {} ORDER BY seq",
            COLUMNS, clause
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, RawRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            match row?.decode(document) {
                Ok(record) => records.push(record),
                Err(e) => eprintln!("⚠️  Skipping unreadable history row: {}", e),
            }
        }
        Ok(records)
    }
}

impl HistoryStore for SqliteStore {
    fn prepare(&mut self, _document: &str) -> Result<(), StoreError> {
        // One shared table; the document is a key column
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                document        TEXT NOT NULL,
                seq             INTEGER NOT NULL,
                rotation        INTEGER NOT NULL,
                horizontal_flip INTEGER NOT NULL,
                vertical_flip   INTEGER NOT NULL,
                brightness      INTEGER NOT NULL,
                contrast        INTEGER NOT NULL,
                sharpness       INTEGER NOT NULL,
                crop_left       INTEGER NOT NULL,
                crop_right      INTEGER NOT NULL,
                crop_top        INTEGER NOT NULL,
                crop_bottom     INTEGER NOT NULL,
                filter          TEXT NOT NULL,
                blur            TEXT NOT NULL,
                created_at      INTEGER NOT NULL,
                PRIMARY KEY (document, seq)
            )",
            [],
        )?;
        Ok(())
    }

    fn append(&mut self, document: &str, seq: i64, state: &EditState) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO history (document, seq, rotation, horizontal_flip, vertical_flip,
                brightness, contrast, sharpness,
                crop_left, crop_right, crop_top, crop_bottom,
                filter, blur, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            rusqlite::params![
                document,
                seq,
                state.rotation,
                state.horizontal_flip,
                state.vertical_flip,
                state.brightness,
                state.contrast,
                state.sharpness,
                state.crop_left,
                state.crop_right,
                state.crop_top,
                state.crop_bottom,
                state.filter,
                state.blur,
                Utc::now().timestamp(),
            ],
        )?;
        Ok(())
    }

    fn truncate_from(&mut self, document: &str, seq: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM history WHERE document = ?1 AND seq >= ?2",
            rusqlite::params![document, seq],
        )?;
        Ok(())
    }

    fn commit(&mut self, document: &str, seq: i64, state: &EditState) -> Result<(), StoreError> {
        // Truncation and append must land together, even if the process
        // dies mid-commit
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM history WHERE document = ?1 AND seq >= ?2",
            rusqlite::params![document, seq],
        )?;
        tx.execute(
            "INSERT INTO history (document, seq, rotation, horizontal_flip, vertical_flip,
                brightness, contrast, sharpness,
                crop_left, crop_right, crop_top, crop_bottom,
                filter, blur, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            rusqlite::params![
                document,
                seq,
                state.rotation,
                state.horizontal_flip,
                state.vertical_flip,
                state.brightness,
                state.contrast,
                state.sharpness,
                state.crop_left,
                state.crop_right,
                state.crop_top,
                state.crop_bottom,
                state.filter,
                state.blur,
                Utc::now().timestamp(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn select_all(&self, document: &str) -> Result<Vec<HistoryRecord>, StoreError> {
        self.select_where("document = ?1", rusqlite::params![document], document)
    }

    fn select_one(&self, document: &str, seq: i64) -> Result<Option<HistoryRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM history WHERE document = ?1 AND seq = ?2",
            COLUMNS
        ))?;
        let mut rows = stmt.query_map(rusqlite::params![document, seq], RawRow::from_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?.decode(document)?)),
            None => Ok(None),
        }
    }

    fn select_next(&self, document: &str, seq: i64) -> Result<Option<HistoryRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM history WHERE document = ?1 AND seq > ?2 ORDER BY seq LIMIT 1",
            COLUMNS
        ))?;
        let mut rows = stmt.query_map(rusqlite::params![document, seq], RawRow::from_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?.decode(document)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// A row exactly as stored, before domain validation.
struct RawRow {
    seq: i64,
    rotation: i64,
    horizontal_flip: bool,
    vertical_flip: bool,
    brightness: i64,
    contrast: i64,
    sharpness: i64,
    crop_left: i64,
    crop_right: i64,
    crop_top: i64,
    crop_bottom: i64,
    filter: String,
    blur: String,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawRow {
            seq: row.get(0)?,
            rotation: row.get(1)?,
            horizontal_flip: row.get(2)?,
            vertical_flip: row.get(3)?,
            brightness: row.get(4)?,
            contrast: row.get(5)?,
            sharpness: row.get(6)?,
            crop_left: row.get(7)?,
            crop_right: row.get(8)?,
            crop_top: row.get(9)?,
            crop_bottom: row.get(10)?,
            filter: row.get(11)?,
            blur: row.get(12)?,
        })
    }

    /// Validate the stored values against the parameter domain.
    /// Anything outside it means the row was tampered with or written by
    /// an incompatible version; the caller skips such records.
    fn decode(self, document: &str) -> Result<HistoryRecord, StoreError> {
        let corrupt = |reason: String| StoreError::CorruptRecord {
            document: document.to_string(),
            seq: self.seq,
            reason,
        };

        let level = |name: &str, value: i64| -> Result<u8, StoreError> {
            if (0..=100).contains(&value) {
                Ok(value as u8)
            } else {
                Err(corrupt(format!("{} = {} is outside [0,100]", name, value)))
            }
        };

        let rotation = i32::try_from(self.rotation)
            .map_err(|_| corrupt(format!("rotation = {} overflows", self.rotation)))?;

        Ok(HistoryRecord {
            seq: self.seq,
            state: EditState {
                rotation,
                horizontal_flip: self.horizontal_flip,
                vertical_flip: self.vertical_flip,
                brightness: level("brightness", self.brightness)?,
                contrast: level("contrast", self.contrast)?,
                sharpness: level("sharpness", self.sharpness)?,
                crop_left: level("crop_left", self.crop_left)?,
                crop_right: level("crop_right", self.crop_right)?,
                crop_top: level("crop_top", self.crop_top)?,
                crop_bottom: level("crop_bottom", self.crop_bottom)?,
                filter: self.filter,
                blur: self.blur,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// The fallback store used when SQLite is unavailable, and the test
/// double. Same contract, vectors instead of tables; history does not
/// survive the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, Vec<HistoryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self, document: &str) -> &[HistoryRecord] {
        self.documents.get(document).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl HistoryStore for MemoryStore {
    fn prepare(&mut self, document: &str) -> Result<(), StoreError> {
        self.documents.entry(document.to_string()).or_default();
        Ok(())
    }

    fn append(&mut self, document: &str, seq: i64, state: &EditState) -> Result<(), StoreError> {
        self.documents
            .entry(document.to_string())
            .or_default()
            .push(HistoryRecord {
                seq,
                state: state.clone(),
            });
        Ok(())
    }

    fn truncate_from(&mut self, document: &str, seq: i64) -> Result<(), StoreError> {
        if let Some(rows) = self.documents.get_mut(document) {
            rows.retain(|record| record.seq < seq);
        }
        Ok(())
    }

    fn select_all(&self, document: &str) -> Result<Vec<HistoryRecord>, StoreError> {
        Ok(self.rows(document).to_vec())
    }

    fn select_one(&self, document: &str, seq: i64) -> Result<Option<HistoryRecord>, StoreError> {
        Ok(self.rows(document).iter().find(|r| r.seq == seq).cloned())
    }

    fn select_next(&self, document: &str, seq: i64) -> Result<Option<HistoryRecord>, StoreError> {
        Ok(self.rows(document).iter().find(|r| r.seq > seq).cloned())
    }
}
