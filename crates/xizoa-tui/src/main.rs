//! Xizoa terminal frontend
//!
//! A terminal host for the xizoa session: lock screen, file explorer, tabs, a rope-backed editor
//! pane and the composed preview markup, built with crossterm and ratatui.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p xizoa-tui -- [config.json]
//! ```
//!
//! The optional config file is the JSON form of `AppConfig`; missing keys take their defaults.
//!
//! # Environment
//!
//! - `XIZOA_DATA_DIR`: where the project is saved (default `.xizoa`)
//! - `XIZOA_PASSWORD` / `XIZOA_APP_KEY`: override the config
//! - `XIZOA_LOG_DIR`: write logs there (filtered by `RUST_LOG`); without it nothing is logged
//!
//! Exports are written to the current directory.
//!
//! # Keys
//!
//! - Lock screen: type the password, Enter to unlock, Ctrl+D for the demo project
//! - Ctrl+N: new file (prompt)
//! - Ctrl+O: import a project JSON (prompt for a path)
//! - Ctrl+E: export
//! - Ctrl+S: save
//! - Ctrl+R: run (open the preview)
//! - Esc: close the preview
//! - Ctrl+W: delete the active file (asks y/n)
//! - Tab / Shift+Tab: next / previous tab
//! - Arrows, Home/End, PageUp/PageDown: move the cursor
//! - Ctrl+Q: quit

mod app;
mod rope_surface;
mod ui;

use app::App;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    env, fs,
    io::{self, stdout},
    path::PathBuf,
    time::Duration,
};
use xizoa_core::{AppConfig, DirStore, DirTransport, FileTransport, KeyValueStore};

const ENV_DATA_DIR: &str = "XIZOA_DATA_DIR";
const ENV_LOG_DIR: &str = "XIZOA_LOG_DIR";
const DEFAULT_DATA_DIR: &str = ".xizoa";

fn setup_tracing() {
    use std::fs::OpenOptions;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    // File layer only; the alternate screen owns stdout.
    if let Some(log_dir) = env::var(ENV_LOG_DIR).ok().map(PathBuf::from)
        && fs::create_dir_all(&log_dir).is_ok()
    {
        let log_path = log_dir.join(format!("xizoa-tui.{}.log", std::process::id()));

        if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("xizoa_core=debug,xizoa_tui=debug,info"));

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .init();

            tracing::info!(path = %log_path.display(), "logging initialized");
        }
    }
}

fn load_config(path: Option<&str>) -> io::Result<AppConfig> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            AppConfig::from_json_str(&text)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?
        }
        None => AppConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn main() -> io::Result<()> {
    setup_tracing();

    let args: Vec<String> = env::args().collect();
    let config = load_config(args.get(1).map(String::as_str))?;
    let data_dir = env::var(ENV_DATA_DIR).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    tracing::info!(data_dir = %data_dir, app_key = %config.app_key, "starting xizoa-tui");

    let mut app = App::new(config, DirStore::new(data_dir), DirTransport::new("."));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "terminal loop failed");
        eprintln!("error: {err}");
    }

    Ok(())
}

fn run_app<B, K, T>(terminal: &mut Terminal<B>, app: &mut App<K, T>) -> io::Result<()>
where
    B: ratatui::backend::Backend,
    K: KeyValueStore,
    T: FileTransport,
{
    loop {
        terminal.draw(|f| ui::render(app, f))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Paste(text) => app.handle_paste(text),
                _ => {}
            }
        }
    }

    tracing::info!("quit");
    Ok(())
}
