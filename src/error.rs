//! Typed errors for the editing core
//!
//! Transform and pipeline failures are always recoverable: geometric edge
//! cases are clamped, a bad filter/blur stage passes the image through
//! unchanged. History store failures are recoverable at the session
//! boundary (fall back to an in-memory log). Nothing in this crate is
//! allowed to take the process down.

use thiserror::Error;

/// Failure of a single filter/blur stage.
///
/// The pipeline reports these as warnings and keeps going; the image for
/// the failed stage is returned unmodified.
#[derive(Error, Debug)]
pub enum TransformError {
    /// The requested filter/blur name is not in the registry.
    /// The stage falls back to the `none` identity.
    #[error("no filter or blur registered under '{0}'")]
    UnregisteredName(String),

    /// An externally registered function panicked during invocation.
    /// The panic is contained; EditState and history are untouched.
    #[error("registered function '{0}' panicked")]
    PluginFailure(String),

    /// Attempt to register a function under a reserved name
    /// (the `none` sentinel).
    #[error("'{0}' is a reserved name")]
    ReservedName(String),
}

/// Failure of the history persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing database could not be opened, read or written.
    /// Sessions recover by switching to an in-memory log.
    #[error("history store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),

    /// The directory for the database file could not be created.
    #[error("could not prepare history directory: {0}")]
    Io(#[from] std::io::Error),

    /// No user data directory could be determined for the database file.
    #[error("no user data directory available")]
    NoDataDir,

    /// A persisted row decoded to values outside the EditState domain
    /// (e.g. a slider level above 100). Callers skip the record.
    #[error("corrupt history record {seq} for '{document}': {reason}")]
    CorruptRecord {
        document: String,
        seq: i64,
        reason: String,
    },
}
