//! Error types.
//!
//! Each concern has its own enum; [`SessionError`] is the umbrella returned by
//! [`crate::Session::execute`]. User-facing code is expected to go through
//! [`crate::Session::dispatch`], which turns every error into a [`crate::Notice`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by [`crate::Project`] mutations.
pub enum ProjectError {
    #[error("file '{0}' already exists")]
    /// A file with this name is already in the project.
    AlreadyExists(String),

    #[error("file '{0}' not found")]
    /// The named file is not in the project.
    NotFound(String),

    #[error("file name must not be empty")]
    /// The file name was empty or whitespace only.
    InvalidName,
}

#[derive(Debug, Error)]
/// Errors produced while decoding an imported snapshot.
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    /// The payload could not be parsed as JSON.
    Parse(#[from] serde_json::Error),

    #[error("snapshot root must be a JSON object")]
    /// The payload parsed, but its root is not an object.
    NotAnObject,

    #[error("snapshot entry '{name}' is invalid: {reason}")]
    /// A single entry could not be turned into a project file.
    InvalidEntry {
        /// The entry key.
        name: String,
        /// Why the entry was rejected.
        reason: String,
    },
}

#[derive(Debug, Error)]
/// Errors produced by key-value stores and file transports.
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    /// The backing store cannot be reached at all.
    Unavailable(String),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("failed to encode project: {0}")]
    /// The project could not be serialized.
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
/// Errors returned by [`crate::Session::execute`].
pub enum SessionError {
    #[error("session is locked")]
    /// The command needs an unlocked session.
    Locked,

    #[error("access denied")]
    /// The password did not match.
    AccessDenied,

    #[error("an import is in progress")]
    /// A project mutation was attempted while an import is pending.
    ImportInProgress,

    #[error("no import is pending")]
    /// `complete_import` was called without a pending import.
    NoPendingImport,

    #[error("import ticket {0} is stale")]
    /// The ticket does not match the pending import.
    StaleImport(u64),

    #[error(transparent)]
    /// A project model error.
    Project(#[from] ProjectError),

    #[error(transparent)]
    /// An import payload error.
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    /// A persistence error.
    Storage(#[from] StorageError),
}
