//! Rope-backed editor surface.
//!
//! Each buffer is a [`Rope`] with its own cursor and scroll position, so switching tabs keeps
//! where the user was. The cursor is a char index into the rope.

use ropey::Rope;
use std::collections::BTreeMap;
use unicode_width::UnicodeWidthChar;
use xizoa_core::{BufferHandle, EditorSurface, LanguageTag};

#[derive(Debug, Clone)]
struct RopeBuffer {
    rope: Rope,
    language: LanguageTag,
    cursor: usize,
    /// Column the cursor tries to return to on vertical moves.
    preferred_column: Option<usize>,
    scroll_top: usize,
}

/// [`EditorSurface`] holding one [`Rope`] per buffer.
#[derive(Debug, Default)]
pub struct RopeSurface {
    next_id: u64,
    buffers: BTreeMap<BufferHandle, RopeBuffer>,
    active: Option<BufferHandle>,
}

impl RopeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn active_mut(&mut self) -> Option<&mut RopeBuffer> {
        let handle = self.active?;
        self.buffers.get_mut(&handle)
    }

    fn active_ref(&self) -> Option<&RopeBuffer> {
        self.active.and_then(|handle| self.buffers.get(&handle))
    }

    /// Language of the shown buffer.
    pub fn active_language(&self) -> Option<LanguageTag> {
        self.active_ref().map(|buffer| buffer.language)
    }

    /// Insert `text` at the cursor. Returns `false` when nothing is shown.
    pub fn insert(&mut self, text: &str) -> bool {
        let Some(buffer) = self.active_mut() else {
            return false;
        };
        buffer.rope.insert(buffer.cursor, text);
        buffer.cursor += text.chars().count();
        buffer.preferred_column = None;
        true
    }

    /// Delete the char before the cursor.
    pub fn backspace(&mut self) -> bool {
        let Some(buffer) = self.active_mut() else {
            return false;
        };
        let width = width_before(&buffer.rope, buffer.cursor);
        if width == 0 {
            return false;
        }
        buffer.rope.remove(buffer.cursor - width..buffer.cursor);
        buffer.cursor -= width;
        buffer.preferred_column = None;
        true
    }

    /// Delete the char under the cursor.
    pub fn delete_forward(&mut self) -> bool {
        let Some(buffer) = self.active_mut() else {
            return false;
        };
        let width = width_after(&buffer.rope, buffer.cursor);
        if width == 0 {
            return false;
        }
        buffer.rope.remove(buffer.cursor..buffer.cursor + width);
        buffer.preferred_column = None;
        true
    }

    pub fn move_left(&mut self) {
        if let Some(buffer) = self.active_mut() {
            buffer.cursor -= width_before(&buffer.rope, buffer.cursor);
            buffer.preferred_column = None;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(buffer) = self.active_mut() {
            buffer.cursor += width_after(&buffer.rope, buffer.cursor);
            buffer.preferred_column = None;
        }
    }

    pub fn move_line_start(&mut self) {
        if let Some(buffer) = self.active_mut() {
            let line = buffer.rope.char_to_line(buffer.cursor);
            buffer.cursor = buffer.rope.line_to_char(line);
            buffer.preferred_column = None;
        }
    }

    pub fn move_line_end(&mut self) {
        if let Some(buffer) = self.active_mut() {
            let line = buffer.rope.char_to_line(buffer.cursor);
            buffer.cursor = buffer.rope.line_to_char(line) + line_len(&buffer.rope, line);
            buffer.preferred_column = None;
        }
    }

    /// Move the cursor `delta` lines, keeping the preferred column where possible.
    pub fn move_lines(&mut self, delta: isize) {
        let Some(buffer) = self.active_mut() else {
            return;
        };
        let line = buffer.rope.char_to_line(buffer.cursor);
        let column = buffer
            .preferred_column
            .unwrap_or(buffer.cursor - buffer.rope.line_to_char(line));
        let last_line = buffer.rope.len_lines().saturating_sub(1);
        let target = line.saturating_add_signed(delta).min(last_line);
        buffer.cursor =
            buffer.rope.line_to_char(target) + column.min(line_len(&buffer.rope, target));
        buffer.preferred_column = Some(column);
    }

    /// Zero-based `(line, column)` of the cursor, in chars.
    pub fn cursor_position(&self) -> Option<(usize, usize)> {
        let buffer = self.active_ref()?;
        let line = buffer.rope.char_to_line(buffer.cursor);
        Some((line, buffer.cursor - buffer.rope.line_to_char(line)))
    }

    /// Display column of the cursor (wide chars count double).
    pub fn cursor_display_column(&self) -> Option<usize> {
        let buffer = self.active_ref()?;
        let line = buffer.rope.char_to_line(buffer.cursor);
        let start = buffer.rope.line_to_char(line);
        Some(
            buffer
                .rope
                .slice(start..buffer.cursor)
                .chars()
                .map(|c| c.width().unwrap_or(0))
                .sum(),
        )
    }

    /// Scroll so the cursor line is inside a viewport of `height` lines; returns the top line.
    pub fn scroll_to_cursor(&mut self, height: usize) -> usize {
        let Some(buffer) = self.active_mut() else {
            return 0;
        };
        let line = buffer.rope.char_to_line(buffer.cursor);
        if line < buffer.scroll_top {
            buffer.scroll_top = line;
        } else if height > 0 && line >= buffer.scroll_top + height {
            buffer.scroll_top = line + 1 - height;
        }
        buffer.scroll_top
    }

    /// Up to `count` lines of the shown buffer starting at `top`, without line breaks.
    pub fn visible_lines(&self, top: usize, count: usize) -> Vec<String> {
        let Some(buffer) = self.active_ref() else {
            return Vec::new();
        };
        (top..buffer.rope.len_lines())
            .take(count)
            .map(|line| {
                let slice = buffer.rope.line(line);
                slice.slice(..line_len(&buffer.rope, line)).to_string()
            })
            .collect()
    }

    /// Number of lines in the shown buffer.
    pub fn line_count(&self) -> usize {
        self.active_ref().map_or(0, |buffer| buffer.rope.len_lines())
    }
}

/// Chars taken by the char before `cursor`; a `\r\n` pair counts as one unit.
fn width_before(rope: &Rope, cursor: usize) -> usize {
    match cursor {
        0 => 0,
        1 => 1,
        _ if rope.char(cursor - 1) == '\n' && rope.char(cursor - 2) == '\r' => 2,
        _ => 1,
    }
}

/// Chars taken by the char at `cursor`; a `\r\n` pair counts as one unit.
fn width_after(rope: &Rope, cursor: usize) -> usize {
    let len = rope.len_chars();
    if cursor >= len {
        0
    } else if cursor + 1 < len && rope.char(cursor) == '\r' && rope.char(cursor + 1) == '\n' {
        2
    } else {
        1
    }
}

/// Length of `line` in chars, excluding its line break.
fn line_len(rope: &Rope, line: usize) -> usize {
    let slice = rope.line(line);
    let mut len = slice.len_chars();
    if len > 0 && slice.char(len - 1) == '\n' {
        len -= 1;
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
    }
    len
}

impl EditorSurface for RopeSurface {
    fn create_buffer(&mut self, content: &str, language: LanguageTag) -> BufferHandle {
        self.next_id += 1;
        let handle = BufferHandle::new(self.next_id);
        self.buffers.insert(
            handle,
            RopeBuffer {
                rope: Rope::from_str(content),
                language,
                cursor: 0,
                preferred_column: None,
                scroll_top: 0,
            },
        );
        handle
    }

    fn dispose_buffer(&mut self, handle: BufferHandle) {
        self.buffers.remove(&handle);
        if self.active == Some(handle) {
            self.active = None;
        }
    }

    fn set_active_buffer(&mut self, handle: Option<BufferHandle>) {
        self.active = handle.filter(|handle| self.buffers.contains_key(handle));
    }

    fn active_buffer_content(&self) -> Option<String> {
        self.active_ref().map(|buffer| buffer.rope.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn surface_with(text: &str) -> RopeSurface {
        let mut surface = RopeSurface::new();
        let handle = surface.create_buffer(text, LanguageTag::Html);
        surface.set_active_buffer(Some(handle));
        surface
    }

    #[test]
    fn test_typing_and_deleting() {
        let mut surface = surface_with("<p></p>");
        for _ in 0..3 {
            surface.move_right();
        }
        assert!(surface.insert("hi"));
        assert_eq!(surface.active_buffer_content().as_deref(), Some("<p>hi</p>"));

        assert!(surface.backspace());
        surface.move_left();
        assert!(surface.delete_forward());
        assert_eq!(surface.active_buffer_content().as_deref(), Some("<p></p>"));
    }

    #[test]
    fn test_vertical_moves_keep_column() {
        let mut surface = surface_with("abcdef\nx\nabcdef");
        surface.move_line_end();
        assert_eq!(surface.cursor_position(), Some((0, 6)));
        surface.move_lines(1);
        assert_eq!(surface.cursor_position(), Some((1, 1)));
        surface.move_lines(1);
        assert_eq!(surface.cursor_position(), Some((2, 6)));
        surface.move_lines(-10);
        assert_eq!(surface.cursor_position(), Some((0, 6)));
    }

    #[test]
    fn test_visible_lines_strip_breaks() {
        let surface = surface_with("one\r\ntwo\nthree");
        assert_eq!(surface.visible_lines(1, 5), vec!["two", "three"]);
        assert_eq!(surface.line_count(), 3);
    }

    #[test]
    fn test_crlf_is_one_cursor_step() {
        let mut surface = surface_with("a\r\nb");
        surface.move_right();
        surface.move_right();
        assert_eq!(surface.cursor_position(), Some((1, 0)));
        assert!(surface.insert("x"));
        assert_eq!(surface.active_buffer_content().as_deref(), Some("a\r\nxb"));
        assert_eq!(surface.line_count(), 2);

        surface.move_left();
        surface.move_left();
        assert_eq!(surface.cursor_position(), Some((0, 1)));
        surface.move_line_end();
        assert_eq!(surface.cursor_position(), Some((0, 1)));
    }

    #[test]
    fn test_crlf_deleted_as_a_pair() {
        let mut surface = surface_with("a\r\nb");
        surface.move_lines(1);
        assert!(surface.backspace());
        assert_eq!(surface.active_buffer_content().as_deref(), Some("ab"));

        let mut surface = surface_with("a\r\nb");
        surface.move_right();
        assert!(surface.delete_forward());
        assert_eq!(surface.active_buffer_content().as_deref(), Some("ab"));
        assert_eq!(surface.cursor_position(), Some((0, 1)));
    }

    #[test]
    fn test_disposing_shown_buffer_shows_nothing() {
        let mut surface = RopeSurface::new();
        let handle = surface.create_buffer("x", LanguageTag::Css);
        surface.set_active_buffer(Some(handle));
        surface.dispose_buffer(handle);
        assert_eq!(surface.active_buffer_content(), None);
        assert!(!surface.insert("y"));
        assert_eq!(surface.buffer_count(), 0);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut surface = surface_with("1\n2\n3\n4\n5\n6");
        surface.move_lines(5);
        assert_eq!(surface.scroll_to_cursor(3), 3);
        surface.move_lines(-5);
        assert_eq!(surface.scroll_to_cursor(3), 0);
    }

    #[test]
    fn test_wide_chars_count_double() {
        let mut surface = surface_with("中文a");
        surface.move_line_end();
        assert_eq!(surface.cursor_display_column(), Some(5));
    }
}
