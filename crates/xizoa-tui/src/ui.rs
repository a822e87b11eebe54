//! Frame rendering.

use crate::app::{App, InputMode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;
use xizoa_core::{FileTransport, KeyValueStore, LanguageTag, Presentation};

const EXPLORER_WIDTH: u16 = 26;

pub fn render<K, T>(app: &mut App<K, T>, frame: &mut Frame)
where
    K: KeyValueStore,
    T: FileTransport,
{
    if app.session.is_unlocked() {
        render_workspace(app, frame);
    } else {
        render_lock_screen(app, frame);
    }
}

fn render_lock_screen<K, T>(app: &App<K, T>, frame: &mut Frame)
where
    K: KeyValueStore,
    T: FileTransport,
{
    let area = centered(frame.area(), 44, 7);
    let masked = "*".repeat(app.password_input.chars().count());
    let mut lines = vec![
        Line::from(Span::styled(
            "XIZOAHUB",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Password: {masked}")),
    ];
    if let Some(message) = app.session.gate().message() {
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        )));
    }

    let block = Block::default().borders(Borders::ALL).title(" Locked ");
    frame.render_widget(Paragraph::new(lines).block(block), area);

    let hint_area = Rect {
        y: area.y.saturating_add(area.height),
        height: 1,
        ..area
    };
    if hint_area.bottom() <= frame.area().bottom() {
        frame.render_widget(
            Paragraph::new("Enter:unlock  Ctrl-D:demo  Ctrl-Q:quit")
                .style(Style::default().fg(Color::DarkGray)),
            hint_area,
        );
    }

    let cursor_x = area.x + 1 + "Password: ".len() as u16 + masked.len() as u16;
    frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 3));
}

fn render_workspace<K, T>(app: &mut App<K, T>, frame: &mut Frame)
where
    K: KeyValueStore,
    T: FileTransport,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Min(1),    // panes
            Constraint::Length(1), // status
            Constraint::Length(1), // shortcuts / prompt
        ])
        .split(frame.area());

    let presentation = app.session.presentation();
    render_tabs(&presentation, frame, chunks[0]);

    let mut constraints = vec![Constraint::Length(EXPLORER_WIDTH), Constraint::Min(10)];
    if app.session.preview().is_some() {
        constraints.push(Constraint::Percentage(45));
    }
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(chunks[1]);

    render_explorer(&presentation, frame, panes[0]);
    render_editor(app, frame, panes[1]);
    if let Some(area) = panes.get(2) {
        render_preview(app, frame, *area);
    }
    render_status_line(app, frame, chunks[2]);
    render_bottom_line(app, frame, chunks[3]);
}

fn language_color(language: LanguageTag) -> Color {
    match language {
        LanguageTag::Html => Color::LightRed,
        LanguageTag::Css => Color::LightBlue,
        LanguageTag::Javascript => Color::Yellow,
        LanguageTag::Plaintext => Color::Gray,
    }
}

fn render_tabs(presentation: &Presentation, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::with_capacity(presentation.tabs.len() * 2);
    for tab in &presentation.tabs {
        let style = if tab.is_active {
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", tab.name), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_explorer(presentation: &Presentation, frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = presentation
        .explorer
        .iter()
        .map(|entry| {
            let marker = if entry.is_active { "▸ " } else { "  " };
            let mut name_style = Style::default();
            if entry.is_active {
                name_style = name_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            Line::from(vec![
                Span::raw(marker),
                Span::styled(entry.name.clone(), name_style),
                Span::raw(" "),
                Span::styled(
                    entry.language.as_str(),
                    Style::default().fg(language_color(entry.language)),
                ),
            ])
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Files ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_editor<K, T>(app: &mut App<K, T>, frame: &mut Frame, area: Rect)
where
    K: KeyValueStore,
    T: FileTransport,
{
    let title = match app.session.active_file() {
        Some(name) => format!(" {name} "),
        None => " (no file) ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;

    let surface = app.session.surface_mut();
    let top = surface.scroll_to_cursor(inner_height);
    let number_width = surface.line_count().max(1).to_string().len();
    let lines: Vec<Line> = surface
        .visible_lines(top, inner_height)
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>number_width$} ", top + i + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(text),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);

    if app.input_mode == InputMode::Normal
        && let Some((line, _)) = surface.cursor_position()
        && let Some(column) = surface.cursor_display_column()
    {
        let x = number_width + 1 + column;
        if x < inner_width && line - top < inner_height {
            frame.set_cursor_position((area.x + 1 + x as u16, area.y + 1 + (line - top) as u16));
        }
    }
}

fn render_preview<K, T>(app: &App<K, T>, frame: &mut Frame, area: Rect)
where
    K: KeyValueStore,
    T: FileTransport,
{
    let Some(document) = app.session.preview() else {
        return;
    };
    let title = if document.used_fallback() {
        " Preview (no index.html) "
    } else {
        " Preview "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Green));
    frame.render_widget(
        Paragraph::new(document.markup())
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_status_line<K, T>(app: &App<K, T>, frame: &mut Frame, area: Rect)
where
    K: KeyValueStore,
    T: FileTransport,
{
    let surface = app.session.surface();
    let position = surface
        .cursor_position()
        .map(|(line, column)| format!("Ln {} Col {}", line + 1, column + 1))
        .unwrap_or_default();
    let language = surface
        .active_language()
        .map(|language| language.as_str())
        .unwrap_or("-");
    let left = app
        .alert
        .as_deref()
        .unwrap_or_else(|| app.session.status());
    let right = format!(
        "{position} | {language} | files:{} buffers:{}",
        app.session.project().len(),
        surface.buffer_count()
    );
    let padding = (area.width as usize).saturating_sub(left.width() + right.width());

    let style = if app.alert.is_some() {
        Style::default().bg(Color::Red).fg(Color::White)
    } else {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    };
    let text = format!("{left}{}{right}", " ".repeat(padding));
    frame.render_widget(
        Paragraph::new(text).style(style.add_modifier(Modifier::BOLD)),
        area,
    );
}

fn render_bottom_line<K, T>(app: &App<K, T>, frame: &mut Frame, area: Rect)
where
    K: KeyValueStore,
    T: FileTransport,
{
    let text = match &app.input_mode {
        InputMode::Normal => {
            "Ctrl-N:new  Ctrl-O:import  Ctrl-E:export  Ctrl-S:save  Ctrl-R:run  Esc:close preview  Ctrl-W:delete  Tab:next  Ctrl-Q:quit"
                .to_string()
        }
        InputMode::NewFile => format!("New file > {}", app.input_buffer),
        InputMode::Import => format!("Import path > {}", app.input_buffer),
        InputMode::ConfirmDelete(name) => format!("Delete {name}? (y/n)"),
    };
    frame.render_widget(
        Paragraph::new(text.clone()).style(Style::default().bg(Color::Blue).fg(Color::White)),
        area,
    );

    if matches!(app.input_mode, InputMode::NewFile | InputMode::Import) {
        let x = area.x + (text.width() as u16).min(area.width.saturating_sub(1));
        frame.set_cursor_position((x, area.y));
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
