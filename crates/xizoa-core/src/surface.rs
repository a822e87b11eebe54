//! Code editor surface capability.
//!
//! `xizoa-core` never renders text. A host provides an [`EditorSurface`]: something that can hold
//! one editable buffer per file, show exactly one of them, and report the text of the buffer it
//! is showing. The content-changed event of the real widget is forwarded by the host as
//! [`crate::Command::ContentChanged`].
//!
//! [`HeadlessSurface`] is an in-memory implementation. It is what tests and non-interactive hosts
//! use, and it records disposals so buffer leaks are observable.

use std::collections::BTreeMap;
use xizoa_lang::LanguageTag;

/// Opaque identifier of a buffer owned by an [`EditorSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferHandle(u64);

impl BufferHandle {
    /// Wrap a surface-specific numeric id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// The editing widget, seen from the core.
pub trait EditorSurface {
    /// Create a buffer seeded with `content`, highlighted as `language`.
    fn create_buffer(&mut self, content: &str, language: LanguageTag) -> BufferHandle;

    /// Release a buffer and everything the widget holds for it.
    ///
    /// Disposing the buffer currently shown must also leave the surface showing nothing.
    fn dispose_buffer(&mut self, handle: BufferHandle);

    /// Show `handle`, or nothing for `None`.
    fn set_active_buffer(&mut self, handle: Option<BufferHandle>);

    /// Text of the buffer currently shown, if any.
    fn active_buffer_content(&self) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeadlessBuffer {
    text: String,
    language: LanguageTag,
}

/// In-memory [`EditorSurface`].
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    next_id: u64,
    buffers: BTreeMap<BufferHandle, HeadlessBuffer>,
    active: Option<BufferHandle>,
    disposed: Vec<BufferHandle>,
}

impl HeadlessSurface {
    /// Create a surface with no buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffer currently shown.
    pub fn active_buffer(&self) -> Option<BufferHandle> {
        self.active
    }

    /// Number of live (created and not yet disposed) buffers.
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Handles disposed so far, in disposal order.
    pub fn disposed(&self) -> &[BufferHandle] {
        &self.disposed
    }

    /// Text of a live buffer.
    pub fn buffer_text(&self, handle: BufferHandle) -> Option<&str> {
        self.buffers.get(&handle).map(|b| b.text.as_str())
    }

    /// Language a live buffer was created with.
    pub fn buffer_language(&self, handle: BufferHandle) -> Option<LanguageTag> {
        self.buffers.get(&handle).map(|b| b.language)
    }

    /// Replace the text of the shown buffer, as a keystroke batch in a real widget would.
    ///
    /// Returns `false` if nothing is shown.
    pub fn type_text(&mut self, text: impl Into<String>) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        match self.buffers.get_mut(&active) {
            Some(buffer) => {
                buffer.text = text.into();
                true
            }
            None => false,
        }
    }
}

impl EditorSurface for HeadlessSurface {
    fn create_buffer(&mut self, content: &str, language: LanguageTag) -> BufferHandle {
        let handle = BufferHandle(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.buffers.insert(
            handle,
            HeadlessBuffer {
                text: content.to_string(),
                language,
            },
        );
        handle
    }

    fn dispose_buffer(&mut self, handle: BufferHandle) {
        if self.buffers.remove(&handle).is_some() {
            self.disposed.push(handle);
        }
        if self.active == Some(handle) {
            self.active = None;
        }
    }

    fn set_active_buffer(&mut self, handle: Option<BufferHandle>) {
        self.active = handle.filter(|h| self.buffers.contains_key(h));
    }

    fn active_buffer_content(&self) -> Option<String> {
        let active = self.active?;
        self.buffers.get(&active).map(|b| b.text.clone())
    }
}
