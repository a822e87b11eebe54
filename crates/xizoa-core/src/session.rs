//! Session controller.
//!
//! A [`Session`] is the single owner of all editing state for one run: the password gate, the
//! [`Project`], the [`EditingBridge`] and its [`EditorSurface`], persistence, the preview pane and
//! the status line. It is constructed once; nothing is global.
//!
//! # Architecture Notes
//!
//! The session follows a unidirectional flow:
//!
//! 1. the host turns a user action into a [`Command`];
//! 2. [`Session::execute`] runs exactly one core operation for it;
//! 3. every resulting state change bumps the session version and notifies subscribers;
//! 4. the host re-reads [`Session::presentation`], [`Session::status`] and
//!    [`Session::preview`] and redraws.
//!
//! [`Session::dispatch`] wraps `execute` for UI callers: it never fails, and converts errors into
//! [`Notice`]s the way the lock screen, status line and alerts expect.
//!
//! # Project sources
//!
//! At construction the project is the saved one, or the starter scaffold when nothing usable is
//! saved. Unlocking re-reads the store so a saved project always wins; the demo action replaces
//! the project before that step. Import replaces the project wholesale.
//!
//! # Import
//!
//! Reading the imported file may be asynchronous in a host. [`Session::begin_import`] opens a
//! critical section: until [`Session::complete_import`] or [`Session::cancel_import`] resolves its
//! ticket, every command except [`Command::ClosePreview`] fails with
//! [`SessionError::ImportInProgress`]. [`Command::Import`] does both steps in one call.

use crate::bridge::EditingBridge;
use crate::commands::{
    Command, CommandResult, DispatchOutcome, Notice, NoticeLevel, SessionChange,
    SessionChangeCallback, SessionChangeKind,
};
use crate::config::AppConfig;
use crate::error::{ProjectError, SessionError, StorageError};
use crate::gate::{ACCESS_DENIED, PasswordGate};
use crate::persistence::PersistenceAdapter;
use crate::presentation::Presentation;
use crate::preview::{self, PreviewDocument};
use crate::project::Project;
use crate::store::{FileTransport, KeyValueStore};
use crate::surface::EditorSurface;

const STATUS_LOCKED: &str = "Locked";
const STATUS_READY: &str = "Editor ready";
const STATUS_SAVED: &str = "Saved locally";
const STATUS_EXPORTED: &str = "Export initiated";
const STATUS_IMPORTED: &str = "Imported project";
const STATUS_IMPORT_PENDING: &str = "Import in progress";
const STATUS_SAVE_FAILED: &str = "Save failed";
const STATUS_STORAGE_FAILED: &str = "Storage unavailable";
const ALERT_FILE_EXISTS: &str = "File exists";
const ALERT_IMPORT_FAILED: &str = "Import failed";
const ALERT_EXPORT_FAILED: &str = "Export failed";

/// Handle of a pending import, returned by [`Session::begin_import`].
#[derive(Debug, PartialEq, Eq)]
pub struct ImportTicket {
    id: u64,
}

impl ImportTicket {
    /// Numeric id of the ticket.
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureContext {
    Import,
    Save,
    Export,
    Other,
}

impl FailureContext {
    fn of(command: &Command) -> Self {
        match command {
            Command::Import { .. } => FailureContext::Import,
            Command::Save => FailureContext::Save,
            Command::Export => FailureContext::Export,
            _ => FailureContext::Other,
        }
    }
}

/// All editing state of one run.
pub struct Session<S, K, T> {
    config: AppConfig,
    gate: PasswordGate,
    project: Project,
    bridge: EditingBridge,
    surface: S,
    persistence: PersistenceAdapter<K>,
    transport: T,
    preview: Option<PreviewDocument>,
    status: String,
    pending_import: Option<u64>,
    next_import_id: u64,
    version: u64,
    callbacks: Vec<SessionChangeCallback>,
}

impl<S, K, T> std::fmt::Debug for Session<S, K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("gate", &self.gate.state())
            .field("file_count", &self.project.len())
            .field("active_file", &self.bridge.active_file())
            .field("buffer_count", &self.bridge.buffer_count())
            .field("preview_open", &self.preview.is_some())
            .field("pending_import", &self.pending_import)
            .field("version", &self.version)
            .finish()
    }
}

impl<S, K, T> Session<S, K, T>
where
    S: EditorSurface,
    K: KeyValueStore,
    T: FileTransport,
{
    /// Create a locked session.
    ///
    /// The project is the one saved under `config.app_key`, or the starter scaffold.
    pub fn new(config: AppConfig, surface: S, store: K, transport: T) -> Self {
        let persistence = PersistenceAdapter::new(store, config.app_key.clone())
            .with_export_filename(config.export_filename.clone());
        let project = match persistence.load_local() {
            Some(saved) => {
                tracing::debug!(files = saved.len(), "starting from saved project");
                saved
            }
            None => {
                tracing::debug!("starting from starter scaffold");
                Project::starter()
            }
        };

        Self {
            gate: PasswordGate::new(config.password.clone()),
            config,
            project,
            bridge: EditingBridge::new(),
            surface,
            persistence,
            transport,
            preview: None,
            status: STATUS_LOCKED.to_string(),
            pending_import: None,
            next_import_id: 0,
            version: 0,
            callbacks: Vec::new(),
        }
    }

    /// The configuration this session was built with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The password gate.
    pub fn gate(&self) -> &PasswordGate {
        &self.gate
    }

    /// Returns `true` once the gate is open.
    pub fn is_unlocked(&self) -> bool {
        self.gate.is_unlocked()
    }

    /// The project model.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// The active file.
    pub fn active_file(&self) -> Option<&str> {
        self.bridge.active_file()
    }

    /// The editing bridge (buffer set queries).
    pub fn bridge(&self) -> &EditingBridge {
        &self.bridge
    }

    /// The editor surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The editor surface, mutably (hosts feed user input through it).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The persistence adapter.
    pub fn persistence(&self) -> &PersistenceAdapter<K> {
        &self.persistence
    }

    /// The file transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The file transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The open preview, if the preview pane is showing.
    pub fn preview(&self) -> Option<&PreviewDocument> {
        self.preview.as_ref()
    }

    /// Status line text.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns `true` while an import ticket is outstanding.
    pub fn is_import_pending(&self) -> bool {
        self.pending_import.is_some()
    }

    /// Explorer and tabs for the current state.
    pub fn presentation(&self) -> Presentation {
        Presentation::project(&self.project, self.bridge.active_file())
    }

    /// Current state version (incremented on every change notification).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if state has changed since a version.
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.version > version
    }

    /// Subscribe to state changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SessionChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Run a command.
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, SessionError> {
        if self.pending_import.is_some() && !command.allowed_during_import() {
            return Err(SessionError::ImportInProgress);
        }
        if !self.gate.is_unlocked() && !command.allowed_while_locked() {
            return Err(SessionError::Locked);
        }

        match command {
            Command::Unlock { password } => self.unlock(&password),
            Command::LoadDemo => self.load_demo(),
            Command::NewFile { name } => self.new_file(&name),
            Command::OpenFile { name } => {
                self.activate(&name)?;
                Ok(CommandResult::Success)
            }
            Command::DeleteFile { name, confirmed } => self.delete_file(&name, confirmed),
            Command::ContentChanged => {
                self.sync_active()?;
                Ok(CommandResult::Success)
            }
            Command::Save => self.save(),
            Command::Export => self.export(),
            Command::Import { handle } => {
                let ticket = self.begin_import()?;
                let text = self.transport.read_file_as_text(&handle);
                self.complete_import(ticket, text)
            }
            Command::Run => self.run(),
            Command::ClosePreview => {
                if self.preview.take().is_some() {
                    self.notify(SessionChangeKind::PreviewChanged);
                }
                Ok(CommandResult::Success)
            }
        }
    }

    /// Run a command on behalf of the user: errors become notices, never failures.
    ///
    /// Status-level notices are also written to the status line.
    pub fn dispatch(&mut self, command: Command) -> DispatchOutcome {
        let context = FailureContext::of(&command);
        let status_before = self.status.clone();

        match self.execute(command) {
            Ok(result) => {
                let notice = (self.status != status_before).then(|| Notice::status(&self.status));
                DispatchOutcome {
                    result: Some(result),
                    notice,
                }
            }
            Err(err) => {
                let notice = Self::notice_for_error(&err, context);
                if let Some(notice) = &notice
                    && notice.level == NoticeLevel::Status
                {
                    self.status = notice.message.clone();
                }
                DispatchOutcome {
                    result: None,
                    notice,
                }
            }
        }
    }

    fn notice_for_error(err: &SessionError, context: FailureContext) -> Option<Notice> {
        match err {
            SessionError::Project(ProjectError::AlreadyExists(_)) => {
                Some(Notice::alert(ALERT_FILE_EXISTS))
            }
            SessionError::Project(ProjectError::InvalidName) => {
                tracing::debug!("ignoring empty file name");
                None
            }
            SessionError::Project(ProjectError::NotFound(name)) => {
                tracing::warn!(file = %name, "command referenced a missing file");
                None
            }
            SessionError::Snapshot(_) => Some(Notice::alert(ALERT_IMPORT_FAILED)),
            SessionError::Storage(_) => Some(match context {
                FailureContext::Import => Notice::alert(ALERT_IMPORT_FAILED),
                FailureContext::Save => Notice::status(STATUS_SAVE_FAILED),
                FailureContext::Export => Notice::alert(ALERT_EXPORT_FAILED),
                FailureContext::Other => Notice::status(STATUS_STORAGE_FAILED),
            }),
            SessionError::Locked => Some(Notice::status(STATUS_LOCKED)),
            SessionError::AccessDenied => Some(Notice::status(ACCESS_DENIED)),
            SessionError::ImportInProgress => Some(Notice::status(STATUS_IMPORT_PENDING)),
            SessionError::NoPendingImport | SessionError::StaleImport(_) => {
                tracing::warn!(error = %err, "ignoring import completion");
                None
            }
        }
    }

    /// Open the import critical section.
    pub fn begin_import(&mut self) -> Result<ImportTicket, SessionError> {
        if !self.gate.is_unlocked() {
            return Err(SessionError::Locked);
        }
        if self.pending_import.is_some() {
            return Err(SessionError::ImportInProgress);
        }
        let id = self.next_import_id;
        self.next_import_id = self.next_import_id.saturating_add(1);
        self.pending_import = Some(id);
        tracing::debug!(ticket = id, "import started");
        Ok(ImportTicket { id })
    }

    /// Finish an import with the text read from the selected file.
    ///
    /// The critical section closes whatever the outcome. On any error the project is left as it
    /// was.
    pub fn complete_import(
        &mut self,
        ticket: ImportTicket,
        text: Result<String, StorageError>,
    ) -> Result<CommandResult, SessionError> {
        self.close_import(&ticket)?;

        let text = text.inspect_err(|err| {
            tracing::warn!(error = %err, "failed to read import file");
        })?;
        let project = self.persistence.import_snapshot(&text).inspect_err(|err| {
            tracing::warn!(error = %err, "rejected import payload");
        })?;

        tracing::info!(files = project.len(), "imported project");
        self.replace_project(project);
        self.status = STATUS_IMPORTED.to_string();
        Ok(CommandResult::Success)
    }

    /// Abandon a pending import without touching the project.
    pub fn cancel_import(&mut self, ticket: ImportTicket) -> Result<(), SessionError> {
        self.close_import(&ticket)?;
        tracing::debug!(ticket = ticket.id, "import cancelled");
        Ok(())
    }

    fn close_import(&mut self, ticket: &ImportTicket) -> Result<(), SessionError> {
        match self.pending_import {
            None => Err(SessionError::NoPendingImport),
            Some(id) if id != ticket.id => Err(SessionError::StaleImport(ticket.id)),
            Some(_) => {
                self.pending_import = None;
                Ok(())
            }
        }
    }

    fn unlock(&mut self, password: &str) -> Result<CommandResult, SessionError> {
        if self.gate.is_unlocked() {
            return Ok(CommandResult::Success);
        }
        if !self.gate.try_unlock(password) {
            tracing::warn!("unlock attempt rejected");
            return Err(SessionError::AccessDenied);
        }
        self.open_editor();
        Ok(CommandResult::Success)
    }

    fn load_demo(&mut self) -> Result<CommandResult, SessionError> {
        self.replace_project(Project::demo());
        if !self.gate.is_unlocked() {
            self.gate.open();
            self.open_editor();
        }
        Ok(CommandResult::Success)
    }

    fn open_editor(&mut self) {
        if let Some(saved) = self.persistence.load_local() {
            self.replace_project(saved);
        }
        self.bridge.reconcile(&self.project, &mut self.surface);
        self.status = STATUS_READY.to_string();
        tracing::info!(files = self.project.len(), "editor unlocked");
        self.notify(SessionChangeKind::Unlocked);
    }

    /// Tear down every buffer, then swap the project in.
    fn replace_project(&mut self, project: Project) {
        self.bridge.teardown(&mut self.surface);
        self.project.replace_all(project);
        if self.gate.is_unlocked() {
            self.bridge.reconcile(&self.project, &mut self.surface);
        }
        self.notify(SessionChangeKind::ProjectReplaced);
    }

    fn activate(&mut self, name: &str) -> Result<(), SessionError> {
        let changed = self.bridge.active_file() != Some(name);
        if !self.bridge.activate(&self.project, &mut self.surface, name) {
            return Err(ProjectError::NotFound(name.to_string()).into());
        }
        if changed {
            self.notify(SessionChangeKind::ActiveFileChanged);
        }
        Ok(())
    }

    fn new_file(&mut self, name: &str) -> Result<CommandResult, SessionError> {
        self.project.create_file(name, "")?;
        tracing::debug!(file = name, "file created");
        self.notify(SessionChangeKind::FileCreated);
        self.activate(name)?;
        Ok(CommandResult::Success)
    }

    fn delete_file(&mut self, name: &str, confirmed: bool) -> Result<CommandResult, SessionError> {
        if !self.project.contains(name) {
            return Err(ProjectError::NotFound(name.to_string()).into());
        }
        if !confirmed {
            return Ok(CommandResult::ConfirmationRequired {
                name: name.to_string(),
            });
        }

        let was_active = self.bridge.active_file() == Some(name);
        self.bridge.release(&mut self.surface, name);
        self.project.delete_file(name)?;
        self.bridge.reconcile(&self.project, &mut self.surface);

        tracing::debug!(file = name, next = ?self.bridge.active_file(), "file deleted");
        self.notify(SessionChangeKind::FileDeleted);
        if was_active {
            self.notify(SessionChangeKind::ActiveFileChanged);
        }
        Ok(CommandResult::Success)
    }

    /// Pull the shown buffer's text into the project.
    fn sync_active(&mut self) -> Result<(), SessionError> {
        if self
            .bridge
            .on_content_changed(&mut self.project, &self.surface)?
        {
            self.notify(SessionChangeKind::ContentChanged);
        }
        Ok(())
    }

    fn save(&mut self) -> Result<CommandResult, SessionError> {
        self.sync_active()?;
        self.persistence.save_local(&self.project)?;
        self.status = STATUS_SAVED.to_string();
        self.notify(SessionChangeKind::Saved);
        Ok(CommandResult::Success)
    }

    fn export(&mut self) -> Result<CommandResult, SessionError> {
        self.sync_active()?;
        let blob = self.persistence.export_snapshot(&self.project)?;
        self.transport.trigger_download(&blob)?;
        self.status = STATUS_EXPORTED.to_string();
        Ok(CommandResult::Exported(blob))
    }

    fn run(&mut self) -> Result<CommandResult, SessionError> {
        self.sync_active()?;
        let document = preview::render(&self.project);
        self.preview = Some(document.clone());
        self.notify(SessionChangeKind::PreviewChanged);
        Ok(CommandResult::Preview(document))
    }

    fn notify(&mut self, kind: SessionChangeKind) {
        let old_version = self.version;
        self.version += 1;
        let change = SessionChange {
            kind,
            old_version,
            new_version: self.version,
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}
