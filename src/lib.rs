//! Non-destructive editing core for a desktop photo editor
//!
//! Two subsystems carry the weight here:
//!
//! - **The transform pipeline**: a fixed-order, deterministic composition
//!   of pure image operations (crop, rotate, flip, display normalization,
//!   brightness/contrast/sharpness, named filter, named blur). The
//!   displayed image is always recomputed from the unmodified source and
//!   a compact [`EditState`] snapshot, never from incremental mutation of
//!   a working copy.
//! - **The edit history engine**: a persisted linear log of those
//!   snapshots per document, with a cursor for undo/redo and branch
//!   truncation on new edits after an undo. History is keyed by the
//!   edited file's base name and survives process restart.
//!
//! [`EditorSession`] ties the two together for one open document. UI
//! concerns (widgets, dialogs, painting, file decode/encode) live
//! outside this crate: sessions receive an already-decoded
//! `image::RgbImage` and hand finished buffers back.

pub mod error;
pub mod pipeline;
pub mod session;
pub mod state;
pub mod transform;

pub use error::{StoreError, TransformError};
pub use pipeline::{RenderOutput, Viewport};
pub use session::EditorSession;
pub use state::{EditState, HistoryLog, HistoryRecord, HistoryStore, MemoryStore, SqliteStore};
pub use transform::{CropSide, Registry};
