//! Project model.
//!
//! A [`Project`] is an insertion-ordered mapping from filename to [`ProjectFile`]. Filenames are
//! the stable identity of a file: there is no rename, and a file's [`LanguageTag`] is decided
//! when it is created.
//!
//! The model is a passive store. Live edits reach it through the editing bridge
//! ([`crate::bridge::EditingBridge`]); buffer lifecycle around deletion and replacement is the
//! session's job, which is why [`Project::delete_file`] and [`Project::replace_all`] do nothing
//! beyond touching the mapping.
//!
//! # Example
//!
//! ```rust
//! use xizoa_core::{LanguageTag, Project, ProjectError};
//!
//! let mut project = Project::new();
//! project.create_file("index.html", "<h1>hi</h1>").unwrap();
//! project.create_file("app.js", "").unwrap();
//!
//! assert_eq!(project.get("app.js").unwrap().language, LanguageTag::Javascript);
//! assert_eq!(
//!     project.create_file("app.js", "again"),
//!     Err(ProjectError::AlreadyExists("app.js".to_string()))
//! );
//! assert_eq!(project.file_names().collect::<Vec<_>>(), ["index.html", "app.js"]);
//! ```

use crate::error::ProjectError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use xizoa_lang::LanguageTag;

/// Name of the markup entry point used by the preview.
pub const INDEX_HTML: &str = "index.html";
/// Name of the style sheet injected into the preview.
pub const STYLE_CSS: &str = "style.css";
/// Name of the script injected into the preview.
pub const SCRIPT_JS: &str = "script.js";

/// A single project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Language tag, fixed at creation.
    pub language: LanguageTag,
    /// Full text content.
    pub content: String,
}

impl ProjectFile {
    /// Create a file record with an explicit language.
    pub fn new(language: LanguageTag, content: impl Into<String>) -> Self {
        Self {
            language,
            content: content.into(),
        }
    }

    /// Create a file record whose language is inferred from `name`.
    pub fn for_name(name: &str, content: impl Into<String>) -> Self {
        Self::new(LanguageTag::from_filename(name), content)
    }
}

/// Insertion-ordered set of project files keyed by filename.
///
/// Equality compares the files as a map; use [`Project::file_names`] to compare ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Project {
    files: IndexMap<String, ProjectFile>,
}

impl Project {
    /// Create an empty project.
    pub fn new() -> Self {
        Self::default()
    }

    /// The scaffold used on first run, when nothing has been persisted yet.
    pub fn starter() -> Self {
        Self::scaffold(
            "<!doctype html><html><head><meta charset=\"utf-8\"><title>Xizoa</title></head><body><h1>XIZOAHUB</h1></body></html>",
            "body{background:#111;color:#0ff;font-family:system-ui;padding:30px}",
            "console.log(\"welcome\");",
        )
    }

    /// The demo project loaded by the explicit demo action.
    pub fn demo() -> Self {
        Self::scaffold(
            "<!doctype html><html><head><meta charset=\"utf-8\"><title>Demo</title></head><body><h1>Hello XIZOAHUB</h1></body></html>",
            "body{background:#111;color:#0ff;font-family:system-ui}",
            "console.log(\"Xizoa demo\");",
        )
    }

    fn scaffold(html: &str, css: &str, js: &str) -> Self {
        Self::from_files([
            (INDEX_HTML.to_string(), ProjectFile::new(LanguageTag::Html, html)),
            (STYLE_CSS.to_string(), ProjectFile::new(LanguageTag::Css, css)),
            (
                SCRIPT_JS.to_string(),
                ProjectFile::new(LanguageTag::Javascript, js),
            ),
        ])
    }

    /// Build a project from `(name, file)` pairs, keeping their order.
    ///
    /// A later pair with a duplicate name overwrites the earlier value but keeps its position.
    pub fn from_files(files: impl IntoIterator<Item = (String, ProjectFile)>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the project has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns `true` if a file with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Look up a file.
    pub fn get(&self, name: &str) -> Option<&ProjectFile> {
        self.files.get(name)
    }

    /// Filenames in insertion order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// The first filename in insertion order.
    pub fn first_file_name(&self) -> Option<&str> {
        self.files.keys().next().map(String::as_str)
    }

    /// Iterate `(name, file)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProjectFile)> {
        self.files.iter().map(|(name, file)| (name.as_str(), file))
    }

    /// Add a new file at the end of the project.
    ///
    /// Fails with [`ProjectError::AlreadyExists`] if the name is taken (the project is left
    /// untouched) and with [`ProjectError::InvalidName`] for an empty or whitespace-only name.
    pub fn create_file(
        &mut self,
        name: &str,
        initial_content: impl Into<String>,
    ) -> Result<(), ProjectError> {
        if name.trim().is_empty() {
            return Err(ProjectError::InvalidName);
        }
        if self.files.contains_key(name) {
            return Err(ProjectError::AlreadyExists(name.to_string()));
        }
        self.files
            .insert(name.to_string(), ProjectFile::for_name(name, initial_content));
        Ok(())
    }

    /// Remove a file, keeping the relative order of the remaining ones.
    pub fn delete_file(&mut self, name: &str) -> Result<ProjectFile, ProjectError> {
        self.files
            .shift_remove(name)
            .ok_or_else(|| ProjectError::NotFound(name.to_string()))
    }

    /// Replace the content of an existing file. The language tag is unchanged.
    pub fn set_content(
        &mut self,
        name: &str,
        content: impl Into<String>,
    ) -> Result<(), ProjectError> {
        let file = self
            .files
            .get_mut(name)
            .ok_or_else(|| ProjectError::NotFound(name.to_string()))?;
        file.content = content.into();
        Ok(())
    }

    /// Substitute the whole mapping.
    pub fn replace_all(&mut self, new_project: Project) {
        *self = new_project;
    }

    /// A full copy of the current mapping.
    pub fn snapshot(&self) -> Project {
        self.clone()
    }
}
