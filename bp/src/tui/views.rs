//! TUI views and rendering
//!
//! All rendering logic is contained here. The views module draws the UI
//! from AppState but never modifies it.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use tracing::trace;

use super::state::{AppState, InteractionMode};
use crate::blueprint::{AnalysisStatus, Gallery, ImagePhase, RenderStyle, Section};

mod colors {
    use ratatui::style::Color;

    pub const READY: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const LOADING: Color = Color::Rgb(255, 215, 0); // Gold
    pub const FAILED: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const SELECTED_BG: Color = Color::Rgb(40, 40, 40);
    pub const CODE: Color = Color::Rgb(144, 238, 144); // Light green
    pub const DIM: Color = Color::DarkGray;
}

/// Main render function
pub fn render(state: &AppState, frame: &mut Frame) {
    trace!(status = %state.status(), "render: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);

    match state.status() {
        AnalysisStatus::Idle => render_input(state, frame, chunks[1]),
        AnalysisStatus::Loading => render_loading(state, frame, chunks[1]),
        AnalysisStatus::Error => render_error(state, frame, chunks[1]),
        AnalysisStatus::Success => render_blueprint(state, frame, chunks[1]),
    }

    render_footer(state, frame, chunks[2]);

    if state.interaction_mode == InteractionMode::Help {
        render_help_overlay(frame, frame.area());
    }
}

fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_header: called");
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            "Hackathon Architect",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
    ];

    match state.status() {
        AnalysisStatus::Idle => spans.push(Span::styled("New Project", Style::default().fg(colors::DIM))),
        AnalysisStatus::Loading => spans.push(Span::styled("Generating", Style::default().fg(colors::LOADING))),
        AnalysisStatus::Error => spans.push(Span::styled("Failed", Style::default().fg(colors::FAILED))),
        AnalysisStatus::Success => {
            spans.push(Span::styled(
                "● Blueprint Ready",
                Style::default().fg(colors::READY).add_modifier(Modifier::BOLD),
            ));
            if let Some(gallery) = &state.gallery {
                let stats = gallery.stats();
                spans.push(Span::raw(" │ "));
                spans.push(Span::styled(
                    format!("visuals {}/{} ready", stats.success, stats.total()),
                    Style::default().fg(colors::DIM),
                ));
                if stats.loading > 0 {
                    spans.push(Span::styled(
                        format!(" · {} generating", stats.loading),
                        Style::default().fg(colors::LOADING),
                    ));
                }
                if stats.error > 0 {
                    spans.push(Span::styled(
                        format!(" · {} failed", stats.error),
                        Style::default().fg(colors::FAILED),
                    ));
                }
            }
        }
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_input(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_input: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let intro = Paragraph::new(vec![
        Line::from(Span::styled(
            "Turn a problem statement into a complete hackathon blueprint.",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Nine sections, from problem overview to the pitch deck, each with generated visuals.",
            Style::default().fg(colors::DIM),
        )),
    ])
    .block(Block::default().borders(Borders::NONE))
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, chunks[0]);

    let mut text: Vec<Line> = state.input.split('\n').map(|l| Line::from(l.to_string())).collect();
    if let Some(last) = text.last_mut() {
        last.spans.push(Span::styled("█", Style::default().fg(colors::KEYBIND)));
    }
    let input = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Problem Statement ")
                .border_style(Style::default().fg(colors::HEADER)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(input, chunks[1]);
}

fn render_loading(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_loading: called");
    let elapsed = state
        .loading_start
        .map(|start| format_elapsed(start.elapsed().as_secs()))
        .unwrap_or_default();

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{}... {}", state.loading_word, elapsed),
            Style::default().fg(colors::LOADING).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Writing all nine sections of your blueprint",
            Style::default().fg(colors::DIM),
        )),
    ];
    let popup = centered_rect(60, 30, area);
    let loading = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(loading, popup);
}

fn render_error(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_error: called");
    let reason = state.orchestrator.error().unwrap_or("Unknown error");
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Blueprint generation failed",
            Style::default().fg(colors::FAILED).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(reason.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(colors::KEYBIND)),
            Span::raw(" try again  "),
            Span::styled("q", Style::default().fg(colors::KEYBIND)),
            Span::raw(" quit"),
        ]),
    ];
    let popup = centered_rect(70, 40, area);
    frame.render_widget(Clear, popup);
    let error = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Error "));
    frame.render_widget(error, popup);
}

fn render_blueprint(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!(tab = ?state.active_tab, "render_blueprint: called");
    let Some(gallery) = &state.gallery else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let titles = Section::ALL
        .into_iter()
        .map(|s| Line::from(format!("{} {}", s.index() + 1, s.label())));
    let tabs = Tabs::new(titles)
        .select(state.active_tab.index())
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("│");
    frame.render_widget(tabs, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    render_section_text(state, gallery, frame, body[0]);
    render_image_cards(state, gallery, frame, body[1]);
}

fn render_section_text(state: &AppState, gallery: &Gallery, frame: &mut Frame, area: Rect) {
    trace!("render_section_text: called");
    let section = state.active_tab;
    let view = gallery.view(section);
    let title = format!(" {} ", section.label());

    let paragraph = if view.display_text.is_empty() {
        Paragraph::new(Span::styled(
            "This section came back empty.",
            Style::default().fg(colors::DIM),
        ))
    } else {
        match section.render_style() {
            RenderStyle::Code => Paragraph::new(view.display_text.as_str()).style(Style::default().fg(colors::CODE)),
            RenderStyle::Text => Paragraph::new(view.display_text.as_str()).wrap(Wrap { trim: false }),
        }
    };

    let copied = if state.copied() { " Copied " } else { "" };
    let paragraph = paragraph.scroll((state.scroll, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_bottom(Line::from(Span::styled(copied, Style::default().fg(colors::READY))).right_aligned()),
    );
    frame.render_widget(paragraph, area);
}

fn render_image_cards(state: &AppState, gallery: &Gallery, frame: &mut Frame, area: Rect) {
    trace!("render_image_cards: called");
    let mut lines: Vec<Line> = Vec::new();

    for (key, unit) in gallery.units(state.active_tab) {
        let selected = key.index == state.selected_card;
        let marker = if selected { "▸ " } else { "  " };
        let title_style = if selected {
            Style::default().bg(colors::SELECTED_BG).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(
            format!("{}Visual {}", marker, key.index + 1),
            title_style,
        )));

        let (status, color) = phase_line(unit.phase());
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(status, Style::default().fg(color)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", truncate_chars(unit.prompt(), 160)),
            Style::default().fg(colors::DIM),
        )));
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No visuals in this section",
            Style::default().fg(colors::DIM),
        )));
    }

    let cards = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Visuals "));
    frame.render_widget(cards, area);
}

/// Status text and color of an image card
fn phase_line(phase: &ImagePhase) -> (String, Color) {
    match phase {
        ImagePhase::Waiting => ("Waiting to generate...".to_string(), colors::DIM),
        ImagePhase::Loading => ("Generating visual...".to_string(), colors::LOADING),
        ImagePhase::Success(image) => (
            format!("Ready · {} · {}  (s to save)", image.mime_type, format_bytes(image.bytes.len())),
            colors::READY,
        ),
        ImagePhase::Error => ("Generation Failed  (r to retry)".to_string(), colors::FAILED),
    }
}

fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_footer: called");
    let mut spans: Vec<Span> = Vec::new();

    if let Some(err) = &state.error_message {
        spans.push(Span::styled(format!(" {} ", err), Style::default().fg(colors::FAILED)));
    } else if let Some(notice) = &state.notice {
        spans.push(Span::styled(format!(" {} ", notice), Style::default().fg(colors::READY)));
    } else {
        let keys: &[(&str, &str)] = match state.status() {
            AnalysisStatus::Idle => &[("Enter", "generate"), ("Alt+Enter", "newline"), ("Esc", "quit")],
            AnalysisStatus::Loading => &[("q", "quit")],
            AnalysisStatus::Error => &[("Enter", "try again"), ("q", "quit")],
            AnalysisStatus::Success => &[
                ("←/→", "tab"),
                ("[/]", "visual"),
                ("r", "retry"),
                ("s", "save"),
                ("c", "copy"),
                ("e", "export"),
                ("n", "new"),
                ("?", "help"),
                ("q", "quit"),
            ],
        };
        for (key, desc) in keys {
            spans.push(Span::styled(format!(" {}", key), Style::default().fg(colors::KEYBIND)));
            spans.push(Span::raw(format!(" {} ", desc)));
        }
    }

    if state.status() != AnalysisStatus::Idle
        && let Some(problem) = state.orchestrator.problem()
    {
        spans.push(Span::raw("│ "));
        spans.push(Span::styled(
            truncate_chars(&problem.replace('\n', " "), 60),
            Style::default().fg(colors::DIM),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    trace!("render_help_overlay: called");
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                .fg(colors::HEADER),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled("Tabs", Style::default().add_modifier(Modifier::BOLD))]),
        key_line("←/→ Tab", "Previous / next section"),
        key_line("1-9", "Jump to section"),
        key_line("j/k", "Scroll section text"),
        key_line("c", "Copy section text"),
        Line::from(""),
        Line::from(vec![Span::styled("Visuals", Style::default().add_modifier(Modifier::BOLD))]),
        key_line("[ ]", "Select visual"),
        key_line("r", "Retry failed visual"),
        key_line("s", "Save visual to the output directory"),
        Line::from(""),
        Line::from(vec![Span::styled("Project", Style::default().add_modifier(Modifier::BOLD))]),
        key_line("e", "Export blueprint and visuals"),
        key_line("n", "New project"),
        key_line("?", "Toggle help"),
        key_line("q", "Quit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (? to close) ")
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help, popup_area);
}

/// Helper to create a key binding line
fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}", key), Style::default().fg(colors::KEYBIND)),
        Span::raw(desc),
    ])
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Truncate to at most `max` characters, marking the cut
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Format a byte count for display (e.g., "512 B", "1.2 KB")
fn format_bytes(count: usize) -> String {
    if count >= 1024 * 1024 {
        format!("{:.1} MB", count as f64 / (1024.0 * 1024.0))
    } else if count >= 1024 {
        format!("{:.1} KB", count as f64 / 1024.0)
    } else {
        format!("{} B", count)
    }
}

/// Format elapsed seconds (e.g., "45s", "1m 15s")
fn format_elapsed(secs: u64) -> String {
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
