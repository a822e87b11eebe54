#![warn(missing_docs)]
//! Xizoa Core - headless state core of a small multi-file web IDE
//!
//! # Overview
//!
//! `xizoa-core` keeps a small HTML/CSS/JS project, the editor buffers that edit it, and the
//! composed live preview consistent under edits, file creation/deletion and import/export. It
//! renders nothing: the text widget, storage and downloads are injected capabilities, so the
//! whole core runs (and is tested) without a UI.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Session (commands, gate, notices)          │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Presentation (explorer + tabs projection)  │  ← Rendering Data
//! ├──────────────────────┬──────────────────────┤
//! │  Editing Bridge      │  Preview Renderer    │  ← Sync / Compose
//! ├──────────────────────┴──────────────────────┤
//! │  Project Model                              │  ← Source of Truth
//! ├─────────────────────────────────────────────┤
//! │  Persistence (store, snapshot codec)        │  ← Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
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
//! session.execute(Command::Unlock { password: "ADMIN".to_string() }).unwrap();
//!
//! // The starter scaffold is active; type into the shown buffer and notify the session.
//! assert_eq!(session.active_file(), Some("index.html"));
//! session.surface_mut().type_text(
//!     "<html><head></head><body><p>hi</p></body></html>",
//! );
//! session.execute(Command::ContentChanged).unwrap();
//!
//! let CommandResult::Preview(doc) = session.execute(Command::Run).unwrap() else {
//!     unreachable!()
//! };
//! assert!(doc.markup().contains("<p>hi</p>"));
//! ```
//!
//! # Module Description
//!
//! - [`project`] - ordered filename → file mapping
//! - [`surface`] - editor widget capability and a headless implementation
//! - [`bridge`] - buffer lifecycle and model ↔ buffer sync
//! - [`presentation`] - explorer/tab projection
//! - [`preview`] - preview document composition
//! - [`store`] / [`persistence`] - key-value store, transports, snapshot codec
//! - [`session`] / [`commands`] - the controller and its command set
//! - [`gate`] - password gate
//! - [`config`] - configuration
//! - [`shell_cache`] - offline app-shell cache policy

pub mod bridge;
pub mod commands;
pub mod config;
pub mod error;
pub mod gate;
pub mod persistence;
pub mod presentation;
pub mod preview;
pub mod project;
pub mod session;
pub mod shell_cache;
pub mod store;
pub mod surface;

pub use bridge::EditingBridge;
pub use commands::{
    Command, CommandResult, DispatchOutcome, Notice, NoticeLevel, SessionChange,
    SessionChangeCallback, SessionChangeKind,
};
pub use config::AppConfig;
pub use error::{ProjectError, SessionError, SnapshotError, StorageError};
pub use gate::{GateState, PasswordGate};
pub use persistence::{PersistenceAdapter, decode_snapshot, encode_snapshot_pretty};
pub use presentation::{ExplorerEntry, FileAction, Presentation, TabEntry};
pub use preview::{Injection, PreviewDocument};
pub use project::{Project, ProjectFile};
pub use session::{ImportTicket, Session};
pub use shell_cache::{
    Activation, CacheStorage, FetchOutcome, LifecycleAction, MemoryCacheStorage, Network,
    NetworkError, Request, Response, ShellCache,
};
pub use store::{
    DirStore, DirTransport, ExportBlob, FileTransport, KeyValueStore, MemoryStore, MemoryTransport,
};
pub use surface::{BufferHandle, EditorSurface, HeadlessSurface};
pub use xizoa_lang::LanguageTag;
