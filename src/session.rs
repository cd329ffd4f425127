//! The editing session orchestrator
//!
//! One session owns one document: the decoded source buffer, the current
//! EditState, the history log, and the filter/blur registries. Every
//! user action follows the same contract:
//!
//! ```text
//! mutate EditState -> pipeline::apply -> HistoryLog::commit
//! ```
//!
//! with exactly one exception: undo/redo apply a historical EditState to
//! the pipeline *without* committing, otherwise replaying history would
//! itself grow the history.
//!
//! The session is single-threaded and synchronous: one document, one
//! cursor, and callers never issue concurrent operations against the
//! same session. Mutators take `&mut self`, which makes that contract a
//! compile-time fact inside one process. Commits are expected to carry
//! finalized values (slider-release, not every drag step); debouncing is
//! the caller's concern.

use std::path::Path;

use image::RgbImage;

use crate::error::TransformError;
use crate::pipeline::{self, RenderOutput, Viewport};
use crate::state::{EditState, HistoryLog, HistoryStore, MemoryStore, SqliteStore};
use crate::transform::{CropSide, Registry};

/// An open document being edited.
pub struct EditorSession {
    source: RgbImage,
    state: EditState,
    history: HistoryLog,
    filters: Registry,
    blurs: Registry,
    viewport: Option<Viewport>,
    current: RgbImage,
    warnings: Vec<TransformError>,
}

impl EditorSession {
    /// Open a session for an already-decoded image.
    ///
    /// History is keyed by the file's base name, so reopening the same
    /// file resumes its log; if prior history exists the tail snapshot
    /// is applied immediately. If the history database cannot be opened
    /// the session warns and continues with an in-memory log: losing
    /// persistence must never block editing.
    pub fn open(path: impl AsRef<Path>, source: RgbImage) -> Self {
        let store: Box<dyn HistoryStore> = match SqliteStore::open_default() {
            Ok(store) => Box::new(store),
            Err(e) => {
                eprintln!("⚠️  History database unavailable ({}), history will not persist", e);
                Box::new(MemoryStore::new())
            }
        };
        Self::with_store(path, source, store)
    }

    /// Open a session against an explicit history store.
    pub fn with_store(
        path: impl AsRef<Path>,
        source: RgbImage,
        store: Box<dyn HistoryStore>,
    ) -> Self {
        let document = HistoryLog::document_id(path.as_ref());
        let (history, resumed) = match HistoryLog::open(store, &document) {
            Ok(opened) => opened,
            Err(e) => {
                eprintln!("⚠️  Could not load history for '{}' ({}), starting fresh in memory", document, e);
                match HistoryLog::open(Box::new(MemoryStore::new()), &document) {
                    Ok(opened) => opened,
                    // MemoryStore operations are infallible
                    Err(_) => unreachable!("in-memory history cannot fail to open"),
                }
            }
        };

        let state = resumed.unwrap_or_default();
        let mut session = EditorSession {
            source,
            state,
            history,
            filters: Registry::filters(),
            blurs: Registry::blurs(),
            viewport: None,
            current: RgbImage::new(1, 1),
            warnings: Vec::new(),
        };
        session.render();
        session
    }

    // ------------------------------------------------------------------
    // Edit actions: mutate -> render -> commit
    // ------------------------------------------------------------------

    /// Rotate a quarter turn counter-clockwise. Repeated turns
    /// accumulate without bound; rendering wraps modulo 360.
    pub fn rotate_ccw(&mut self) -> &RgbImage {
        self.state.rotation += 90;
        self.render_and_commit()
    }

    /// Rotate a quarter turn clockwise.
    pub fn rotate_cw(&mut self) -> &RgbImage {
        self.state.rotation -= 90;
        self.render_and_commit()
    }

    /// Toggle the mirror along the vertical axis.
    pub fn toggle_horizontal_flip(&mut self) -> &RgbImage {
        self.state.horizontal_flip = !self.state.horizontal_flip;
        self.render_and_commit()
    }

    /// Toggle the mirror along the horizontal axis.
    pub fn toggle_vertical_flip(&mut self) -> &RgbImage {
        self.state.vertical_flip = !self.state.vertical_flip;
        self.render_and_commit()
    }

    /// Set the brightness level (finalized slider value, [0,100]).
    pub fn set_brightness(&mut self, level: u8) -> &RgbImage {
        self.state.set_brightness(level);
        self.render_and_commit()
    }

    /// Set the contrast level (finalized slider value, [0,100]).
    pub fn set_contrast(&mut self, level: u8) -> &RgbImage {
        self.state.set_contrast(level);
        self.render_and_commit()
    }

    /// Set the sharpness level (finalized slider value, [0,100]).
    pub fn set_sharpness(&mut self, level: u8) -> &RgbImage {
        self.state.set_sharpness(level);
        self.render_and_commit()
    }

    /// Set the crop percentage for one side of the original image.
    pub fn set_crop(&mut self, side: CropSide, percent: u8) -> &RgbImage {
        self.state.set_crop(side, percent);
        self.render_and_commit()
    }

    /// Select the active filter. Selecting any filter deselects the
    /// previous one; `"none"` clears. Unknown names are rejected without
    /// touching the current state.
    pub fn set_filter(&mut self, name: &str) -> Result<&RgbImage, TransformError> {
        if !self.filters.contains(name) {
            return Err(TransformError::UnregisteredName(name.to_string()));
        }
        self.state.filter = name.to_string();
        Ok(self.render_and_commit())
    }

    /// Select the active blur, with the same exclusivity and rejection
    /// rules as [`set_filter`](Self::set_filter).
    pub fn set_blur(&mut self, name: &str) -> Result<&RgbImage, TransformError> {
        if !self.blurs.contains(name) {
            return Err(TransformError::UnregisteredName(name.to_string()));
        }
        self.state.blur = name.to_string();
        Ok(self.render_and_commit())
    }

    /// Return every parameter to the pristine default. Recorded in
    /// history like any other edit, so a reset can be undone.
    pub fn reset(&mut self) -> &RgbImage {
        self.state.reset();
        self.render_and_commit()
    }

    // ------------------------------------------------------------------
    // History replay: render without committing
    // ------------------------------------------------------------------

    /// Step back one history record and re-render from it. No-op at the
    /// first record or on an empty history. Never commits.
    pub fn undo(&mut self) -> &RgbImage {
        match self.history.undo() {
            Ok(Some(state)) => {
                self.state = state;
                self.render();
            }
            Ok(None) => {}
            Err(e) => eprintln!("⚠️  Undo failed: {}", e),
        }
        &self.current
    }

    /// Step forward one history record and re-render from it. No-op at
    /// the tail. Never commits.
    pub fn redo(&mut self) -> &RgbImage {
        match self.history.redo() {
            Ok(Some(state)) => {
                self.state = state;
                self.render();
            }
            Ok(None) => {}
            Err(e) => eprintln!("⚠️  Redo failed: {}", e),
        }
        &self.current
    }

    // ------------------------------------------------------------------
    // Plugin registration
    // ------------------------------------------------------------------

    /// Register an external filter function under a name; it becomes
    /// selectable immediately. See [`Registry::register`] for the
    /// containment rules.
    pub fn register_filter(
        &mut self,
        name: &str,
        f: impl Fn(&RgbImage) -> RgbImage + Send + Sync + 'static,
    ) -> Result<(), TransformError> {
        self.filters.register(name, f)
    }

    /// Register an external blur function under a name.
    pub fn register_blur(
        &mut self,
        name: &str,
        f: impl Fn(&RgbImage) -> RgbImage + Send + Sync + 'static,
    ) -> Result<(), TransformError> {
        self.blurs.register(name, f)
    }

    // ------------------------------------------------------------------
    // Inspection / export
    // ------------------------------------------------------------------

    /// The last rendered image, for display or export encoding.
    pub fn current_image(&self) -> &RgbImage {
        &self.current
    }

    /// Render the full-resolution image for export, ignoring the
    /// display viewport.
    pub fn export_image(&self) -> RgbImage {
        let output = pipeline::apply(&self.source, &self.state, &self.filters, &self.blurs, None);
        output.image
    }

    /// The current parameter snapshot.
    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// Warnings produced by the most recent render (unknown names,
    /// contained plugin panics).
    pub fn last_warnings(&self) -> &[TransformError] {
        &self.warnings
    }

    /// The history log, for cursor inspection.
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Names selectable as filters right now.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.names()
    }

    /// Names selectable as blurs right now.
    pub fn blur_names(&self) -> Vec<&str> {
        self.blurs.names()
    }

    /// Set or clear the display viewport and re-render. A display
    /// concern, so this never commits.
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) -> &RgbImage {
        self.viewport = viewport;
        self.render();
        &self.current
    }

    // ------------------------------------------------------------------

    fn render(&mut self) {
        let RenderOutput { image, warnings } =
            pipeline::apply(&self.source, &self.state, &self.filters, &self.blurs, self.viewport);
        for warning in &warnings {
            eprintln!("⚠️  Render warning: {}", warning);
        }
        self.current = image;
        self.warnings = warnings;
    }

    fn render_and_commit(&mut self) -> &RgbImage {
        self.render();
        if let Err(e) = self.history.commit(&self.state) {
            // Losing a history write degrades undo, not editing
            eprintln!("⚠️  Could not record edit in history: {}", e);
        }
        &self.current
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("document", &self.history.document())
            .field("cursor", &self.history.cursor())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::state::store::HistoryRecord;

    fn source() -> RgbImage {
        RgbImage::from_fn(40, 20, |x, y| {
            image::Rgb([(x * 6 % 256) as u8, (y * 12 % 256) as u8, 77])
        })
    }

    fn session() -> EditorSession {
        EditorSession::with_store("photo.jpg", source(), Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_fresh_session_shows_the_source() {
        let session = session();
        assert_eq!(*session.current_image(), source());
        assert!(session.state().is_pristine());
        assert_eq!(session.history().cursor(), 0);
    }

    #[test]
    fn test_each_action_commits_one_record() {
        let mut session = session();
        session.rotate_ccw();
        session.set_brightness(80);
        session.toggle_horizontal_flip();
        assert_eq!(session.history().cursor(), 3);
    }

    #[test]
    fn test_undo_restores_previous_parameters_without_committing() {
        let mut session = session();
        session.rotate_ccw();
        session.set_brightness(80);

        session.undo();
        assert_eq!(session.state().rotation, 90);
        assert_eq!(session.state().brightness, 50);
        // Replay must not have appended anything
        assert_eq!(session.history().records().unwrap().len(), 2);
    }

    #[test]
    fn test_redo_after_undo_restores_the_newer_snapshot() {
        let mut session = session();
        session.rotate_ccw();
        session.set_brightness(80);

        session.undo();
        session.redo();
        assert_eq!(session.state().brightness, 80);
        assert_eq!(session.history().cursor(), 2);
    }

    #[test]
    fn test_fresh_edit_after_undo_truncates_the_future() {
        let mut session = session();
        session.rotate_ccw(); // A: rotation 90
        session.set_brightness(80); // B
        session.set_contrast(10); // C

        session.undo();
        session.undo(); // back at A
        session.set_sharpness(90); // D, invalidates B and C

        session.redo(); // must be a no-op
        assert_eq!(session.state().sharpness, 90);

        let records: Vec<HistoryRecord> = session.history().records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].state.rotation, 90);
        assert_eq!(records[1].state.sharpness, 90);
    }

    #[test]
    fn test_undo_floor_and_redo_ceiling() {
        let mut session = session();
        session.rotate_ccw();

        session.undo();
        session.undo();
        assert_eq!(session.history().cursor(), 1);

        session.redo();
        session.redo();
        assert_eq!(session.history().cursor(), 1);
    }

    #[test]
    fn test_selecting_a_second_filter_replaces_the_first() {
        let mut session = session();
        session.set_filter("black_white").unwrap();
        session.set_filter("sepia").unwrap();
        assert_eq!(session.state().filter, "sepia");
    }

    #[test]
    fn test_unknown_filter_is_rejected_without_state_change() {
        let mut session = session();
        let before = session.history().cursor();
        let err = session.set_filter("vortex").unwrap_err();
        assert!(matches!(err, TransformError::UnregisteredName(_)));
        assert_eq!(session.state().filter, "none");
        assert_eq!(session.history().cursor(), before);
    }

    #[test]
    fn test_registered_plugin_is_selectable_and_contained() {
        let mut session = session();
        session
            .register_filter("zero_blue", |img: &RgbImage| {
                let mut out = img.clone();
                for image::Rgb([_, _, b]) in out.pixels_mut() {
                    *b = 0;
                }
                out
            })
            .unwrap();
        session.set_filter("zero_blue").unwrap();
        assert_eq!(session.current_image().get_pixel(0, 0)[2], 0);

        // A panicking plugin degrades its own stage only
        session.register_filter("explode", |_: &RgbImage| panic!("bad plugin")).unwrap();
        session.set_filter("explode").unwrap();
        assert!(matches!(session.last_warnings()[0], TransformError::PluginFailure(_)));
        // History and editing stay alive
        session.set_brightness(60);
        assert_eq!(session.state().brightness, 60);
    }

    #[test]
    fn test_reset_is_recorded_and_undoable() {
        let mut session = session();
        session.rotate_ccw();
        session.reset();
        assert!(session.state().is_pristine());

        session.undo();
        assert_eq!(session.state().rotation, 90);
    }

    #[test]
    fn test_viewport_changes_do_not_commit() {
        let mut session = session();
        session.set_viewport(Some(Viewport { width: 10, height: 10 }));
        assert_eq!(session.history().cursor(), 0);
        assert_eq!(session.current_image().dimensions(), (10, 5));
        // Export ignores the viewport
        assert_eq!(session.export_image().dimensions(), (40, 20));
    }

    #[test]
    fn test_resume_from_persisted_history() {
        let db = std::env::temp_dir().join(format!("session_resume_{}.db", std::process::id()));
        let _ = std::fs::remove_file(&db);

        {
            let store = SqliteStore::open(&db).unwrap();
            let mut session = EditorSession::with_store("photo.jpg", source(), Box::new(store));
            session.rotate_ccw();
            session.set_brightness(90);
        }

        let store = SqliteStore::open(&db).unwrap();
        let session = EditorSession::with_store("photo.jpg", source(), Box::new(store));
        assert_eq!(session.state().rotation, 90);
        assert_eq!(session.state().brightness, 90);
        assert_eq!(session.history().cursor(), 2);

        let _ = std::fs::remove_file(&db);
    }

    /// A store that fails every operation, standing in for an
    /// unreachable database.
    struct BrokenStore;

    impl HistoryStore for BrokenStore {
        fn prepare(&mut self, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
        }
        fn append(&mut self, _: &str, _: i64, _: &EditState) -> Result<(), StoreError> {
            Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
        }
        fn truncate_from(&mut self, _: &str, _: i64) -> Result<(), StoreError> {
            Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
        }
        fn select_all(&self, _: &str) -> Result<Vec<HistoryRecord>, StoreError> {
            Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
        }
        fn select_one(&self, _: &str, _: i64) -> Result<Option<HistoryRecord>, StoreError> {
            Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
        }
        fn select_next(&self, _: &str, _: i64) -> Result<Option<HistoryRecord>, StoreError> {
            Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
        }
    }

    #[test]
    fn test_unavailable_store_falls_back_to_in_memory_editing() {
        let mut session = EditorSession::with_store("photo.jpg", source(), Box::new(BrokenStore));
        // Editing and undo/redo still work against the fallback log
        session.rotate_ccw();
        session.set_brightness(70);
        session.undo();
        assert_eq!(session.state().brightness, 50);
        assert_eq!(session.state().rotation, 90);
    }
}
