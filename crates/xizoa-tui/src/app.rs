//! Application state and key handling.

use crate::rope_surface::RopeSurface;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use xizoa_core::{
    AppConfig, Command, CommandResult, FileTransport, KeyValueStore, NoticeLevel, Session,
};

/// What the bottom prompt line is collecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Keys go to the editor.
    Normal,
    /// Name of a file to create.
    NewFile,
    /// Path of a project JSON to import.
    Import,
    /// Waiting for y/n before deleting the named file.
    ConfirmDelete(String),
}

/// Lines moved by PageUp/PageDown.
const PAGE_LINES: isize = 20;

/// Terminal host around a [`Session`].
pub struct App<K, T> {
    pub session: Session<RopeSurface, K, T>,
    /// Lock screen password field.
    pub password_input: String,
    pub input_mode: InputMode,
    /// Prompt text for [`InputMode::NewFile`] and [`InputMode::Import`].
    pub input_buffer: String,
    /// Last alert, shown until the next key press.
    pub alert: Option<String>,
    pub should_quit: bool,
}

impl<K, T> App<K, T>
where
    K: KeyValueStore,
    T: FileTransport,
{
    pub fn new(config: AppConfig, store: K, transport: T) -> Self {
        Self {
            session: Session::new(config, RopeSurface::new(), store, transport),
            password_input: String::new(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            alert: None,
            should_quit: false,
        }
    }

    /// Dispatch `command`, keeping alerts for the next frame.
    fn apply(&mut self, command: Command) -> Option<CommandResult> {
        let outcome = self.session.dispatch(command);
        if let Some(notice) = outcome.notice
            && notice.level == NoticeLevel::Alert
        {
            tracing::debug!(message = %notice.message, "alert");
            self.alert = Some(notice.message);
        }
        outcome.result
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.alert = None;

        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return;
        }

        if !self.session.is_unlocked() {
            self.handle_lock_key(key);
            return;
        }

        if self.input_mode != InputMode::Normal {
            self.handle_prompt_key(key);
            return;
        }

        self.handle_editor_key(key);
    }

    fn handle_lock_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('d')) => {
                self.apply(Command::LoadDemo);
                self.password_input.clear();
            }
            (_, KeyCode::Enter) => {
                let password = std::mem::take(&mut self.password_input);
                self.apply(Command::Unlock { password });
            }
            (_, KeyCode::Backspace) => {
                self.password_input.pop();
            }
            (mods, KeyCode::Char(c)) if !mods.contains(KeyModifiers::CONTROL) => {
                self.password_input.push(c);
            }
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        if let InputMode::ConfirmDelete(name) = &self.input_mode {
            let name = name.clone();
            match key.code {
                KeyCode::Char('y' | 'Y') => {
                    self.input_mode = InputMode::Normal;
                    self.apply(Command::DeleteFile {
                        name,
                        confirmed: true,
                    });
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input_buffer);
                let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
                let text = text.trim().to_string();
                match mode {
                    InputMode::NewFile => {
                        self.apply(Command::NewFile { name: text });
                    }
                    InputMode::Import if !text.is_empty() => {
                        self.apply(Command::Import { handle: text });
                    }
                    _ => {}
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
                self.input_mode = InputMode::NewFile;
                self.input_buffer.clear();
            }
            (KeyModifiers::CONTROL, KeyCode::Char('o')) => {
                self.input_mode = InputMode::Import;
                self.input_buffer.clear();
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                self.apply(Command::Export);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                self.apply(Command::Save);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
                self.apply(Command::Run);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => {
                if let Some(name) = self.session.active_file().map(str::to_string)
                    && let Some(CommandResult::ConfirmationRequired { name }) =
                        self.apply(Command::DeleteFile {
                            name,
                            confirmed: false,
                        })
                {
                    self.input_mode = InputMode::ConfirmDelete(name);
                }
            }
            (_, KeyCode::Esc) => {
                self.apply(Command::ClosePreview);
            }
            (_, KeyCode::Tab) => self.switch_tab(1),
            (_, KeyCode::BackTab) => self.switch_tab(-1),

            (_, KeyCode::Left) => self.session.surface_mut().move_left(),
            (_, KeyCode::Right) => self.session.surface_mut().move_right(),
            (_, KeyCode::Up) => self.session.surface_mut().move_lines(-1),
            (_, KeyCode::Down) => self.session.surface_mut().move_lines(1),
            (_, KeyCode::PageUp) => self.session.surface_mut().move_lines(-PAGE_LINES),
            (_, KeyCode::PageDown) => self.session.surface_mut().move_lines(PAGE_LINES),
            (_, KeyCode::Home) => self.session.surface_mut().move_line_start(),
            (_, KeyCode::End) => self.session.surface_mut().move_line_end(),

            (_, KeyCode::Enter) => self.edit(|surface| surface.insert("\n")),
            (_, KeyCode::Backspace) => self.edit(RopeSurface::backspace),
            (_, KeyCode::Delete) => self.edit(RopeSurface::delete_forward),
            (mods, KeyCode::Char(c))
                if !mods.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let mut buf = [0u8; 4];
                let text = c.encode_utf8(&mut buf);
                self.edit(|surface| surface.insert(text));
            }
            _ => {}
        }
    }

    /// Bracketed paste goes straight into the shown buffer.
    pub fn handle_paste(&mut self, text: String) {
        if self.session.is_unlocked() && self.input_mode == InputMode::Normal {
            let text = text.replace("\r\n", "\n");
            self.edit(|surface| surface.insert(&text));
        } else if self.session.is_unlocked() {
            self.input_buffer.push_str(text.trim_end());
        } else {
            self.password_input.push_str(text.trim_end());
        }
    }

    /// Apply an edit to the surface and report it to the session.
    fn edit(&mut self, op: impl FnOnce(&mut RopeSurface) -> bool) {
        if op(self.session.surface_mut()) {
            self.apply(Command::ContentChanged);
        }
    }

    fn switch_tab(&mut self, offset: isize) {
        let presentation = self.session.presentation();
        if let Some(tab) = presentation.tab_relative_to_active(offset) {
            self.apply(tab.switch_action().into_command());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xizoa_core::{MemoryStore, MemoryTransport};

    fn press(app: &mut App<MemoryStore, MemoryTransport>, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App<MemoryStore, MemoryTransport>, c: char) {
        app.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_str(app: &mut App<MemoryStore, MemoryTransport>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn unlocked_app() -> App<MemoryStore, MemoryTransport> {
        let mut app = App::new(
            AppConfig::default(),
            MemoryStore::new(),
            MemoryTransport::new(),
        );
        type_str(&mut app, "ADMIN");
        press(&mut app, KeyCode::Enter);
        assert!(app.session.is_unlocked());
        app
    }

    #[test]
    fn test_wrong_password_keeps_lock() {
        let mut app = App::new(
            AppConfig::default(),
            MemoryStore::new(),
            MemoryTransport::new(),
        );
        type_str(&mut app, "nope");
        press(&mut app, KeyCode::Enter);
        assert!(!app.session.is_unlocked());
        assert_eq!(app.session.gate().message(), Some("ACCESS DENIED"));
        assert_eq!(app.password_input, "");
    }

    #[test]
    fn test_demo_shortcut_unlocks() {
        let mut app = App::new(
            AppConfig::default(),
            MemoryStore::new(),
            MemoryTransport::new(),
        );
        ctrl(&mut app, 'd');
        assert!(app.session.is_unlocked());
        assert_eq!(app.session.active_file(), Some("index.html"));
    }

    #[test]
    fn test_typing_reaches_project() {
        let mut app = unlocked_app();
        ctrl(&mut app, 'n');
        type_str(&mut app, "a.js");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.active_file(), Some("a.js"));

        type_str(&mut app, "let x;");
        press(&mut app, KeyCode::Backspace);
        let file = app.session.project().get("a.js").unwrap();
        assert_eq!(file.content, "let x");
    }

    #[test]
    fn test_duplicate_name_raises_alert() {
        let mut app = unlocked_app();
        ctrl(&mut app, 'n');
        type_str(&mut app, "index.html");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.alert.as_deref(), Some("File exists"));
        press(&mut app, KeyCode::Left);
        assert_eq!(app.alert, None);
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut app = unlocked_app();
        ctrl(&mut app, 'w');
        assert_eq!(
            app.input_mode,
            InputMode::ConfirmDelete("index.html".to_string())
        );
        press(&mut app, KeyCode::Char('n'));
        assert!(app.session.project().contains("index.html"));

        ctrl(&mut app, 'w');
        press(&mut app, KeyCode::Char('y'));
        assert!(!app.session.project().contains("index.html"));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_tab_keys_cycle_files() {
        let mut app = unlocked_app();
        let names: Vec<String> = app
            .session
            .project()
            .file_names()
            .map(str::to_string)
            .collect();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.session.active_file(), Some(names[1].as_str()));
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.session.active_file(), names.last().map(String::as_str));
    }

    #[test]
    fn test_run_and_escape_toggle_preview() {
        let mut app = unlocked_app();
        ctrl(&mut app, 'r');
        assert!(app.session.preview().is_some());
        press(&mut app, KeyCode::Esc);
        assert!(app.session.preview().is_none());
    }
}
