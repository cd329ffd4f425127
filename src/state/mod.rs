//! State management module
//!
//! This module handles everything about an edit that is not pixels:
//! - The EditState parameter snapshot (edit.rs)
//! - The undo/redo history engine (history.rs)
//! - The persistence contract and its SQLite / in-memory backends (store.rs)

pub mod edit;
pub mod history;
pub mod store;

pub use edit::EditState;
pub use history::HistoryLog;
pub use store::{HistoryRecord, HistoryStore, MemoryStore, SqliteStore};
