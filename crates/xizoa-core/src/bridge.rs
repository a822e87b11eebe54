//! Editing surface bridge.
//!
//! Keeps a [`Project`] and an [`EditorSurface`] in step:
//!
//! - a buffer is created lazily, the first time its file becomes active, seeded with the
//!   project's content and language;
//! - the surface always shows exactly the buffer of the active file (or nothing);
//! - content-changed notifications copy the shown buffer's text back into the project. This is
//!   the only way live edits reach the model;
//! - buffers are disposed before their project entry disappears, and all of them are torn down
//!   before the project is replaced.
//!
//! The bridge owns no project data and no surface. Both are passed into each operation by the
//! owner (normally [`crate::Session`]).

use crate::error::ProjectError;
use crate::project::Project;
use crate::surface::{BufferHandle, EditorSurface};
use std::collections::BTreeMap;

/// Buffer set and active-file pointer.
#[derive(Debug, Default)]
pub struct EditingBridge {
    buffers: BTreeMap<String, BufferHandle>,
    active: Option<String>,
}

impl EditingBridge {
    /// Create a bridge with no buffers and no active file.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active file, if any.
    pub fn active_file(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Buffer handle of an opened file.
    pub fn buffer_for(&self, name: &str) -> Option<BufferHandle> {
        self.buffers.get(name).copied()
    }

    /// Names of files that currently own a buffer (sorted).
    pub fn buffer_names(&self) -> impl Iterator<Item = &str> {
        self.buffers.keys().map(String::as_str)
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Make `name` the active file.
    ///
    /// Returns `false` (and changes nothing) if `name` is not in `project`.
    pub fn activate<S: EditorSurface + ?Sized>(
        &mut self,
        project: &Project,
        surface: &mut S,
        name: &str,
    ) -> bool {
        let Some(file) = project.get(name) else {
            return false;
        };

        let handle = match self.buffers.get(name) {
            Some(handle) => *handle,
            None => {
                let handle = surface.create_buffer(&file.content, file.language);
                tracing::debug!(file = name, buffer = handle.get(), "created buffer");
                self.buffers.insert(name.to_string(), handle);
                handle
            }
        };

        surface.set_active_buffer(Some(handle));
        self.active = Some(name.to_string());
        true
    }

    /// Copy the shown buffer's text into the project entry of the active file.
    ///
    /// Returns whether the stored content changed. Repeated notifications simply overwrite the
    /// entry, so only the latest text is ever kept.
    pub fn on_content_changed<S: EditorSurface + ?Sized>(
        &mut self,
        project: &mut Project,
        surface: &S,
    ) -> Result<bool, ProjectError> {
        let Some(active) = self.active.as_deref() else {
            return Ok(false);
        };
        let Some(text) = surface.active_buffer_content() else {
            return Ok(false);
        };

        let unchanged = project
            .get(active)
            .is_some_and(|file| file.content == text);
        if unchanged {
            return Ok(false);
        }

        project.set_content(active, text)?;
        Ok(true)
    }

    /// Dispose the buffer of `name` (if it has one) ahead of its removal from the project.
    ///
    /// If `name` was active, the surface is cleared and no file is active afterwards; call
    /// [`EditingBridge::reconcile`] once the project entry is gone to pick the next one.
    pub fn release<S: EditorSurface + ?Sized>(&mut self, surface: &mut S, name: &str) {
        if let Some(handle) = self.buffers.remove(name) {
            surface.dispose_buffer(handle);
            tracing::debug!(file = name, buffer = handle.get(), "disposed buffer");
        }
        if self.active.as_deref() == Some(name) {
            surface.set_active_buffer(None);
            self.active = None;
        }
    }

    /// Dispose every buffer and clear the active file, ahead of a project replacement.
    pub fn teardown<S: EditorSurface + ?Sized>(&mut self, surface: &mut S) {
        surface.set_active_buffer(None);
        let count = self.buffers.len();
        for (_, handle) in std::mem::take(&mut self.buffers) {
            surface.dispose_buffer(handle);
        }
        self.active = None;
        tracing::debug!(count, "tore down all buffers");
    }

    /// Restore the bridge invariants after a project change.
    ///
    /// - buffers whose file no longer exists are disposed;
    /// - an active file that no longer exists is dropped;
    /// - with no active file, the first file in insertion order is activated;
    /// - an empty project leaves the surface showing nothing.
    pub fn reconcile<S: EditorSurface + ?Sized>(&mut self, project: &Project, surface: &mut S) {
        let orphans: Vec<String> = self
            .buffers
            .keys()
            .filter(|name| !project.contains(name))
            .cloned()
            .collect();
        for name in orphans {
            self.release(surface, &name);
        }

        if self
            .active
            .as_deref()
            .is_some_and(|name| !project.contains(name))
        {
            self.active = None;
        }

        if self.active.is_none() {
            match project.first_file_name() {
                Some(first) => {
                    let first = first.to_string();
                    self.activate(project, surface, &first);
                }
                None => surface.set_active_buffer(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    fn project() -> Project {
        let mut project = Project::new();
        project.create_file("a.html", "<p>a</p>").unwrap();
        project.create_file("b.css", "p{}").unwrap();
        project
    }

    #[test]
    fn activation_is_lazy_and_reuses_buffers() {
        let project = project();
        let mut surface = HeadlessSurface::new();
        let mut bridge = EditingBridge::new();

        assert_eq!(bridge.buffer_count(), 0);
        assert!(bridge.activate(&project, &mut surface, "b.css"));
        let first = bridge.buffer_for("b.css").unwrap();
        assert!(bridge.activate(&project, &mut surface, "a.html"));
        assert!(bridge.activate(&project, &mut surface, "b.css"));

        assert_eq!(bridge.buffer_for("b.css"), Some(first));
        assert_eq!(bridge.buffer_count(), 2);
        assert_eq!(surface.live_buffer_count(), 2);
        assert_eq!(surface.active_buffer(), Some(first));
    }

    #[test]
    fn activating_unknown_file_is_a_no_op() {
        let project = project();
        let mut surface = HeadlessSurface::new();
        let mut bridge = EditingBridge::new();

        assert!(!bridge.activate(&project, &mut surface, "missing.js"));
        assert_eq!(bridge.active_file(), None);
        assert_eq!(surface.live_buffer_count(), 0);
    }

    #[test]
    fn reconcile_drops_orphans_and_picks_first() {
        let mut project = project();
        let mut surface = HeadlessSurface::new();
        let mut bridge = EditingBridge::new();
        bridge.activate(&project, &mut surface, "a.html");
        bridge.activate(&project, &mut surface, "b.css");

        // Removing the key without `release` leaves an orphan for reconcile to clean up.
        project.delete_file("b.css").unwrap();
        bridge.reconcile(&project, &mut surface);

        assert_eq!(bridge.active_file(), Some("a.html"));
        assert_eq!(bridge.buffer_names().collect::<Vec<_>>(), ["a.html"]);
        assert_eq!(surface.live_buffer_count(), 1);
    }
}
