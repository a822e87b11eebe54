//! Persistence adapter and snapshot codec.
//!
//! The snapshot format is a JSON object mapping filename to `{"language", "content"}`:
//!
//! ```json
//! {
//!   "index.html": { "language": "html", "content": "<h1>hi</h1>" },
//!   "app.js": { "language": "javascript", "content": "" }
//! }
//! ```
//!
//! Decoding is lenient in the same ways for the local store and for imports:
//! - a bare string value is a legacy entry; its language is inferred from the filename;
//! - a record may spell the language field `lang` (older saves) or omit it (inferred);
//! - a missing `content` is an empty file.
//!
//! Saving overwrites unconditionally. Loading never fails: absent, unreadable or corrupt data
//! all read as "nothing saved".

use crate::error::{SnapshotError, StorageError};
use crate::project::{Project, ProjectFile};
use crate::store::{ExportBlob, KeyValueStore};
use serde_json::{Map, Value};
use xizoa_lang::LanguageTag;

/// Default key-value store key.
pub const DEFAULT_APP_KEY: &str = "xizoa-advanced-v1";
/// Default filename of exported snapshots.
pub const DEFAULT_EXPORT_FILENAME: &str = "xizoa-project.json";
/// MIME type of exported snapshots.
pub const EXPORT_MIME_TYPE: &str = "application/json";

/// Save/load/export of whole projects.
#[derive(Debug)]
pub struct PersistenceAdapter<K> {
    store: K,
    key: String,
    export_filename: String,
}

impl<K: KeyValueStore> PersistenceAdapter<K> {
    /// Persist under `key` in `store`.
    pub fn new(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        }
    }

    /// Override the suggested filename of exports.
    pub fn with_export_filename(mut self, filename: impl Into<String>) -> Self {
        self.export_filename = filename.into();
        self
    }

    /// The store key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying store.
    pub fn store(&self) -> &K {
        &self.store
    }

    /// The underlying store, mutably.
    pub fn store_mut(&mut self) -> &mut K {
        &mut self.store
    }

    /// Write the whole project under the key, replacing whatever was there.
    pub fn save_local(&mut self, project: &Project) -> Result<(), StorageError> {
        let payload = serde_json::to_string(project)?;
        self.store.set(&self.key, &payload).inspect_err(|err| {
            tracing::error!(key = %self.key, error = %err, "failed to save project");
        })?;
        tracing::debug!(key = %self.key, files = project.len(), "project saved");
        Ok(())
    }

    /// Read the saved project.
    ///
    /// Returns `None` when nothing usable is saved: the key is absent, the store fails, the
    /// payload does not decode, or it decodes to an empty project.
    pub fn load_local(&self) -> Option<Project> {
        let payload = match self.store.get(&self.key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "project store unavailable");
                return None;
            }
        };

        match decode_snapshot(&payload) {
            Ok(project) if project.is_empty() => None,
            Ok(project) => Some(project),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "ignoring corrupt saved project");
                None
            }
        }
    }

    /// Encode `project` as a pretty-printed (2-space) JSON download.
    pub fn export_snapshot(&self, project: &Project) -> Result<ExportBlob, StorageError> {
        Ok(ExportBlob {
            filename: self.export_filename.clone(),
            mime_type: EXPORT_MIME_TYPE.to_string(),
            bytes: encode_snapshot_pretty(project)?.into_bytes(),
        })
    }

    /// Decode an imported snapshot. See [`decode_snapshot`].
    pub fn import_snapshot(&self, text: &str) -> Result<Project, SnapshotError> {
        decode_snapshot(text)
    }
}

/// Encode a project with 2-space indentation.
pub fn encode_snapshot_pretty(project: &Project) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(project)
}

/// Decode snapshot text, normalizing legacy entries. File order follows the document.
pub fn decode_snapshot(text: &str) -> Result<Project, SnapshotError> {
    let Value::Object(entries) = serde_json::from_str::<Value>(text)? else {
        return Err(SnapshotError::NotAnObject);
    };

    let mut files = Vec::with_capacity(entries.len());
    for (name, value) in entries {
        if name.trim().is_empty() {
            return Err(invalid(&name, "empty filename"));
        }
        let file = decode_entry(&name, value)?;
        files.push((name, file));
    }
    Ok(Project::from_files(files))
}

fn decode_entry(name: &str, value: Value) -> Result<ProjectFile, SnapshotError> {
    match value {
        Value::String(content) => Ok(ProjectFile::for_name(name, content)),
        Value::Object(record) => decode_record(name, record),
        other => Err(invalid(
            name,
            format!("expected a string or an object, found {}", kind_of(&other)),
        )),
    }
}

fn decode_record(name: &str, mut record: Map<String, Value>) -> Result<ProjectFile, SnapshotError> {
    let language = match record.remove("language").or_else(|| record.remove("lang")) {
        None | Some(Value::Null) => LanguageTag::from_filename(name),
        Some(Value::String(tag)) => tag.parse().unwrap_or_default(),
        Some(other) => {
            return Err(invalid(
                name,
                format!("language must be a string, found {}", kind_of(&other)),
            ));
        }
    };

    let content = match record.remove("content") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(content)) => content,
        Some(other) => {
            return Err(invalid(
                name,
                format!("content must be a string, found {}", kind_of(&other)),
            ));
        }
    };

    Ok(ProjectFile::new(language, content))
}

fn invalid(name: &str, reason: impl Into<String>) -> SnapshotError {
    SnapshotError::InvalidEntry {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
