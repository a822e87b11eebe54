//! Command interface.
//!
//! Every user action is one [`Command`]; [`crate::Session::execute`] maps each command to exactly
//! one core operation. After a command changes state, subscribers receive a [`SessionChange`] and
//! the host recomputes its presentation.
//!
//! # Example
//!
//! ```rust
//! use xizoa_core::{
//!     AppConfig, Command, CommandResult, HeadlessSurface, MemoryStore, MemoryTransport, Session,
//! };
//!
//! let mut session = Session::new(
//!     AppConfig::default(),
//!     HeadlessSurface::new(),
//!     MemoryStore::new(),
//!     MemoryTransport::new(),
//! );
//!
//! session.execute(Command::Unlock { password: "ADMIN".to_string() }).unwrap();
//! session.execute(Command::NewFile { name: "notes.txt".to_string() }).unwrap();
//! assert_eq!(session.active_file(), Some("notes.txt"));
//!
//! let result = session.execute(Command::DeleteFile {
//!     name: "notes.txt".to_string(),
//!     confirmed: false,
//! }).unwrap();
//! assert!(matches!(result, CommandResult::ConfirmationRequired { .. }));
//! ```

use crate::preview::PreviewDocument;
use crate::store::ExportBlob;

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit the lock-screen password.
    Unlock {
        /// Entered password.
        password: String,
    },
    /// Load the demo project and enter the editor.
    LoadDemo,
    /// Create an empty file and open it.
    NewFile {
        /// Filename (its suffix decides the language).
        name: String,
    },
    /// Make a file active (explorer "open" or tab "switch").
    OpenFile {
        /// Filename.
        name: String,
    },
    /// Delete a file. Without `confirmed`, only asks for confirmation.
    DeleteFile {
        /// Filename.
        name: String,
        /// Whether the user already confirmed.
        confirmed: bool,
    },
    /// The editor surface reported a change in the shown buffer.
    ContentChanged,
    /// Save the project to the key-value store.
    Save,
    /// Offer the project as a JSON download.
    Export,
    /// Read a user-selected file and replace the project with it.
    Import {
        /// Transport-specific file handle (a path for file-backed transports).
        handle: String,
    },
    /// Compose the preview and open the preview pane.
    Run,
    /// Close the preview pane.
    ClosePreview,
}

impl Command {
    /// Whether the command may run while the gate is locked.
    pub fn allowed_while_locked(&self) -> bool {
        matches!(self, Command::Unlock { .. } | Command::LoadDemo)
    }

    /// Whether the command may run while an import is pending.
    pub fn allowed_during_import(&self) -> bool {
        matches!(self, Command::ClosePreview)
    }
}

/// Successful outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Done, nothing to return.
    Success,
    /// A destructive command needs the user's confirmation before it runs.
    ConfirmationRequired {
        /// File about to be deleted.
        name: String,
    },
    /// The composed preview.
    Preview(PreviewDocument),
    /// The exported snapshot, already handed to the transport.
    Exported(ExportBlob),
}

/// How a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Status line text.
    Status,
    /// A message the user has to acknowledge (non-blocking for the core).
    Alert,
}

/// A user-visible message produced by [`crate::Session::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Presentation level.
    pub level: NoticeLevel,
    /// Text.
    pub message: String,
}

impl Notice {
    /// A status line message.
    pub fn status(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Status,
            message: message.into(),
        }
    }

    /// An alert.
    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Alert,
            message: message.into(),
        }
    }
}

/// Result of [`crate::Session::dispatch`]: never an error, at most a notice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// The command's result, if it succeeded.
    pub result: Option<CommandResult>,
    /// Message for the user, if any.
    pub notice: Option<Notice>,
}

/// Kind of state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChangeKind {
    /// The gate opened.
    Unlocked,
    /// The whole project was replaced (initial load, demo, import).
    ProjectReplaced,
    /// A file was added.
    FileCreated,
    /// A file was removed.
    FileDeleted,
    /// A file's content changed.
    ContentChanged,
    /// A different file became active.
    ActiveFileChanged,
    /// The preview pane opened, refreshed or closed.
    PreviewChanged,
    /// The project was written to the store.
    Saved,
}

/// State change record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    /// Change kind.
    pub kind: SessionChangeKind,
    /// Session version before the change.
    pub old_version: u64,
    /// Session version after the change.
    pub new_version: u64,
}

/// State change callback function type.
pub type SessionChangeCallback = Box<dyn FnMut(&SessionChange) + Send>;
