#![warn(missing_docs)]
//! `xizoa-lang` - language tags for xizoa project files.
//!
//! This crate intentionally stays lightweight. It provides the closed set of language tags a
//! project file can carry, plus the filename suffix rule used to infer a tag when a file is
//! created or when a legacy snapshot stores bare strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Language tag attached to a project file.
///
/// The tag is decided once, when the file is created, and is never re-derived from later
/// renames or content changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageTag {
    /// HyperText markup (`.html`).
    Html,
    /// Style sheets (`.css`).
    Css,
    /// Scripts (`.js`).
    Javascript,
    /// Anything else.
    #[default]
    Plaintext,
}

impl LanguageTag {
    /// All tags, in declaration order.
    pub const ALL: [LanguageTag; 4] = [
        LanguageTag::Html,
        LanguageTag::Css,
        LanguageTag::Javascript,
        LanguageTag::Plaintext,
    ];

    /// Infer a tag from a filename suffix.
    ///
    /// Matching is a plain, case-sensitive suffix test: `.html`, `.css`, `.js`; every other
    /// name maps to [`LanguageTag::Plaintext`].
    pub fn from_filename(name: &str) -> Self {
        if name.ends_with(".html") {
            LanguageTag::Html
        } else if name.ends_with(".css") {
            LanguageTag::Css
        } else if name.ends_with(".js") {
            LanguageTag::Javascript
        } else {
            LanguageTag::Plaintext
        }
    }

    /// The wire identifier of this tag (also the id editor widgets expect).
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageTag::Html => "html",
            LanguageTag::Css => "css",
            LanguageTag::Javascript => "javascript",
            LanguageTag::Plaintext => "plaintext",
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by [`LanguageTag::from_str`] for identifiers outside the known set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language tag '{}'", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for LanguageTag {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

impl Serialize for LanguageTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LanguageTag {
    /// Unknown identifiers degrade to [`LanguageTag::Plaintext`] so that snapshots written by
    /// other tools still load.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}
