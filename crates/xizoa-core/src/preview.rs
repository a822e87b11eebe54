//! Preview composition.
//!
//! The preview is a single static document built from three well-known files:
//!
//! 1. the markup of `index.html` (or [`FALLBACK_DOCUMENT`] when it is missing);
//! 2. `style.css`, wrapped in a `<style>` block, inserted right before the first `</head>`;
//! 3. `script.js`, wrapped in a `<script>` block, inserted right before the first `</body>`.
//!
//! Insertion is textual and only ever targets the first occurrence. A missing closing tag means
//! the block is dropped, never an error. The result is a plain string meant for an isolated
//! rendering surface; it carries nothing from the host.
//!
//! # Example
//!
//! ```rust
//! use xizoa_core::{Project, preview};
//!
//! let mut project = Project::new();
//! project.create_file("index.html", "<html><head></head><body></body></html>").unwrap();
//! project.create_file("style.css", "body{color:red}").unwrap();
//!
//! let doc = preview::render(&project);
//! assert_eq!(
//!     doc.markup(),
//!     "<html><head><style>body{color:red}</style></head><body></body></html>"
//! );
//! ```

use crate::project::{INDEX_HTML, Project, SCRIPT_JS, STYLE_CSS};

/// Document shown when the project has no `index.html`.
pub const FALLBACK_DOCUMENT: &str = "<h1>No index.html</h1>";

const HEAD_CLOSE: &str = "</head>";
const BODY_CLOSE: &str = "</body>";

/// What happened to one companion file during composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    /// The companion file does not exist.
    Absent,
    /// The block was inserted.
    Injected,
    /// The file exists but the markup has no matching closing tag.
    Dropped,
}

/// A composed preview document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    markup: String,
    used_fallback: bool,
    style: Injection,
    script: Injection,
}

impl PreviewDocument {
    /// The composed markup.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Consume the document, returning the markup.
    pub fn into_markup(self) -> String {
        self.markup
    }

    /// Whether [`FALLBACK_DOCUMENT`] stood in for a missing `index.html`.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Outcome for `style.css`.
    pub fn style(&self) -> Injection {
        self.style
    }

    /// Outcome for `script.js`.
    pub fn script(&self) -> Injection {
        self.script
    }
}

/// Insert `block` right before the first occurrence of `marker`.
fn insert_before_first(markup: &mut String, marker: &str, block: &str) -> bool {
    match markup.find(marker) {
        Some(at) => {
            markup.insert_str(at, block);
            true
        }
        None => false,
    }
}

fn inject(
    markup: &mut String,
    source: Option<&str>,
    open: &str,
    close: &str,
    marker: &str,
) -> Injection {
    let Some(source) = source else {
        return Injection::Absent;
    };
    let block = format!("{open}{source}{close}");
    if insert_before_first(markup, marker, &block) {
        Injection::Injected
    } else {
        Injection::Dropped
    }
}

/// Compose the preview document for `project`. Never fails.
pub fn render(project: &Project) -> PreviewDocument {
    let (mut markup, used_fallback) = match project.get(INDEX_HTML) {
        Some(index) => (index.content.clone(), false),
        None => (FALLBACK_DOCUMENT.to_string(), true),
    };

    let css = project.get(STYLE_CSS).map(|f| f.content.as_str());
    let style = inject(&mut markup, css, "<style>", "</style>", HEAD_CLOSE);

    let js = project.get(SCRIPT_JS).map(|f| f.content.as_str());
    let script = inject(&mut markup, js, "<script>", "</script>", BODY_CLOSE);

    if style == Injection::Dropped || script == Injection::Dropped {
        tracing::debug!(?style, ?script, "preview markup is missing a closing tag");
    }

    PreviewDocument {
        markup,
        used_fallback,
        style,
        script,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_targets_first_occurrence_only() {
        let mut markup = String::from("a</head>b</head>");
        assert!(insert_before_first(&mut markup, "</head>", "X"));
        assert_eq!(markup, "aX</head>b</head>");

        let mut none = String::from("plain");
        assert!(!insert_before_first(&mut none, "</head>", "X"));
        assert_eq!(none, "plain");
    }
}
