//! Storage collaborators.
//!
//! - [`KeyValueStore`]: where the whole project is saved (a browser host maps this to local
//!   storage; the terminal host uses [`DirStore`]).
//! - [`FileTransport`]: user-initiated downloads and reads of user-selected files.
//!
//! In-memory implementations are provided for tests and headless hosts.

use crate::error::StorageError;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A string key-value store.
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// A file offered to the user for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlob {
    /// Suggested filename.
    pub filename: String,
    /// MIME type.
    pub mime_type: String,
    /// File bytes.
    pub bytes: Vec<u8>,
}

impl ExportBlob {
    /// The bytes as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Download/upload mechanics.
pub trait FileTransport {
    /// Hand `blob` to the user as a download.
    fn trigger_download(&mut self, blob: &ExportBlob) -> Result<(), StorageError>;

    /// Read the text of a user-selected file.
    fn read_file_as_text(&mut self, handle: &str) -> Result<String, StorageError>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    unavailable: bool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every access fails, like storage disabled by the user agent.
    pub fn unavailable() -> Self {
        Self {
            entries: HashMap::new(),
            unavailable: true,
        }
    }

    /// Seed a value without going through [`KeyValueStore::set`].
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Raw stored value.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("memory store disabled".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// [`KeyValueStore`] keeping one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Use `root` as the storage directory. It is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file}.json"))
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// [`FileTransport`] that saves downloads into a directory and reads uploads from paths.
#[derive(Debug, Clone)]
pub struct DirTransport {
    download_dir: PathBuf,
}

impl DirTransport {
    /// Save downloads into `download_dir`.
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
        }
    }

    /// Where a download named `filename` ends up.
    pub fn download_path(&self, filename: &str) -> PathBuf {
        self.download_dir.join(filename)
    }
}

impl FileTransport for DirTransport {
    fn trigger_download(&mut self, blob: &ExportBlob) -> Result<(), StorageError> {
        fs::create_dir_all(&self.download_dir)?;
        let path = self.download_path(&blob.filename);
        fs::write(&path, &blob.bytes)?;
        tracing::info!(path = %path.display(), bytes = blob.bytes.len(), "download written");
        Ok(())
    }

    fn read_file_as_text(&mut self, handle: &str) -> Result<String, StorageError> {
        Ok(fs::read_to_string(handle)?)
    }
}

/// In-memory [`FileTransport`]: downloads are collected, uploads come from a seeded map.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    downloads: Vec<ExportBlob>,
    files: HashMap<String, String>,
}

impl MemoryTransport {
    /// Create a transport with no files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `text` readable under `handle`.
    pub fn with_file(mut self, handle: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(handle.into(), text.into());
        self
    }

    /// Downloads triggered so far.
    pub fn downloads(&self) -> &[ExportBlob] {
        &self.downloads
    }
}

impl FileTransport for MemoryTransport {
    fn trigger_download(&mut self, blob: &ExportBlob) -> Result<(), StorageError> {
        self.downloads.push(blob.clone());
        Ok(())
    }

    fn read_file_as_text(&mut self, handle: &str) -> Result<String, StorageError> {
        self.files.get(handle).cloned().ok_or_else(|| {
            StorageError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {handle}"),
            ))
        })
    }
}
