//! Explorer and tab strip projection.
//!
//! The presentation is a pure function of the project's ordered filenames and the active file.
//! It holds no state of its own and never mutates the project: entries only hand out
//! [`FileAction`]s, which the host turns into [`Command`]s and dispatches.

use crate::commands::Command;
use crate::project::Project;
use xizoa_lang::LanguageTag;

/// Action offered by an explorer entry or a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    /// Explorer "open".
    Open(String),
    /// Explorer "delete". Dispatching it asks for confirmation first.
    Delete(String),
    /// Tab "switch".
    Switch(String),
}

impl FileAction {
    /// The command this action dispatches.
    pub fn into_command(self) -> Command {
        match self {
            FileAction::Open(name) | FileAction::Switch(name) => Command::OpenFile { name },
            FileAction::Delete(name) => Command::DeleteFile {
                name,
                confirmed: false,
            },
        }
    }
}

/// One row of the explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerEntry {
    /// Filename.
    pub name: String,
    /// Language tag of the file.
    pub language: LanguageTag,
    /// Whether this is the active file.
    pub is_active: bool,
}

impl ExplorerEntry {
    /// The "open" action of this row.
    pub fn open_action(&self) -> FileAction {
        FileAction::Open(self.name.clone())
    }

    /// The "delete" action of this row.
    pub fn delete_action(&self) -> FileAction {
        FileAction::Delete(self.name.clone())
    }
}

/// One tab of the tab strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabEntry {
    /// Filename.
    pub name: String,
    /// Whether this is the active file.
    pub is_active: bool,
}

impl TabEntry {
    /// The "switch" action of this tab.
    pub fn switch_action(&self) -> FileAction {
        FileAction::Switch(self.name.clone())
    }
}

/// Explorer rows and tabs, both in project insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Presentation {
    /// Explorer rows.
    pub explorer: Vec<ExplorerEntry>,
    /// Tab strip.
    pub tabs: Vec<TabEntry>,
}

impl Presentation {
    /// Project `(project, active)` into explorer rows and tabs.
    pub fn project(project: &Project, active: Option<&str>) -> Self {
        let explorer = project
            .iter()
            .map(|(name, file)| ExplorerEntry {
                name: name.to_string(),
                language: file.language,
                is_active: active == Some(name),
            })
            .collect();
        let tabs = project
            .file_names()
            .map(|name| TabEntry {
                name: name.to_string(),
                is_active: active == Some(name),
            })
            .collect();
        Self { explorer, tabs }
    }

    /// Index of the active tab.
    pub fn active_tab_index(&self) -> Option<usize> {
        self.tabs.iter().position(|t| t.is_active)
    }

    /// The tab `offset` steps away from the active one, wrapping around.
    ///
    /// With no active tab, stepping starts from the first tab.
    pub fn tab_relative_to_active(&self, offset: isize) -> Option<&TabEntry> {
        if self.tabs.is_empty() {
            return None;
        }
        let len = self.tabs.len() as isize;
        let current = self.active_tab_index().unwrap_or(0) as isize;
        let index = (current + offset).rem_euclid(len) as usize;
        self.tabs.get(index)
    }
}
