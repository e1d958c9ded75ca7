use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Screen, SettingsRow};
use crate::clock::format_remaining;
use crate::session::Phase;

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;
const LABEL_GAP: &str = "  ";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Menu => render_menu(self, area, buf),
            Screen::Settings => render_settings(self, area, buf),
            Screen::Game => render_game(self, area, buf),
            Screen::Finished => render_finished(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn status_line(app: &App) -> Line<'static> {
    match &app.status {
        Some(msg) => Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red))),
        None => Line::default(),
    }
}

fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let settings = &app.settings;
    let lines = vec![
        Line::from(Span::styled("numsort", bold().fg(Color::Cyan))),
        Line::default(),
        Line::from("Pick every category that fits the number."),
        Line::from(Span::styled(
            format!(
                "goal {} points · {} min · hints {} · {} groups",
                settings.goal_points,
                settings.duration_minutes,
                if settings.hover_enabled { "on" } else { "off" },
                settings.enabled_groups.len()
            ),
            dim(),
        )),
        Line::default(),
        Line::from("(s)tart   (c)ategories & settings   (q)uit"),
        Line::default(),
        status_line(app),
    ];

    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(top), Constraint::Min(0)])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
}

fn render_settings(app: &App, area: Rect, buf: &mut Buffer) {
    let settings = &app.settings;
    let mut lines: Vec<Line> = SettingsRow::all()
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let text = match row {
                SettingsRow::Goal => format!("Goal points      < {} >", settings.goal_points),
                SettingsRow::Duration => {
                    format!("Game time (min)  < {} >", settings.duration_minutes)
                }
                SettingsRow::Hints => format!(
                    "[{}] Show category hints",
                    if settings.hover_enabled { "x" } else { " " }
                ),
                SettingsRow::Group(group) => format!(
                    "[{}] {}",
                    if settings.enabled_groups.contains(&group) {
                        "x"
                    } else {
                        " "
                    },
                    group
                ),
            };
            let style = if idx == app.settings_cursor {
                bold().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "↑/↓ move · ←/→ adjust · space toggle · esc save & back",
        dim(),
    )));
    lines.push(status_line(app));

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Settings"))
        .render(area, buf);
}

fn render_game(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // score + timer
            Constraint::Length(1), // progress
            Constraint::Length(3), // number
            Constraint::Min(1),    // categories
            Constraint::Length(1), // result
            Constraint::Length(1), // hint
            Constraint::Length(1), // keys
        ])
        .split(area);

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);
    Paragraph::new(Span::styled(format!("Score: {}", session.score()), bold()))
        .render(header[0], buf);
    Paragraph::new(Span::styled(
        format!("Time: {}", format_remaining(session.remaining())),
        bold(),
    ))
    .alignment(Alignment::Right)
    .render(header[1], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(session.progress_fraction().clamp(0.0, 1.0))
        .label(format!("{} / {}", session.score(), session.config().goal_points))
        .render(chunks[1], buf);

    if let Some(n) = session.current_number() {
        Paragraph::new(Span::styled(n.to_string(), bold().fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(chunks[2], buf);
    }

    Paragraph::new(category_lines(app, chunks[3].width))
        .wrap(Wrap { trim: false })
        .render(chunks[3], buf);

    let resolved = session.phase() == Phase::RoundResolved;
    if let (true, Some(result)) = (resolved, session.last_result()) {
        Paragraph::new(Span::styled(result.summary(), bold()))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    if let Some(hint) = app.cursor_label().and_then(|label| session.hint(&label)) {
        Paragraph::new(Span::styled(
            hint,
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
    }

    Paragraph::new(Span::styled(
        "←/→ move · space select · enter check · esc menu",
        dim(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[6], buf);
}

/// One heading per group, its labels packed onto as many lines as `width`
/// needs.
fn category_lines(app: &App, width: u16) -> Vec<Line<'static>> {
    let session = &app.session;
    let Some(round) = session.round() else {
        return Vec::new();
    };
    let result = match session.phase() {
        Phase::RoundResolved => session.last_result(),
        _ => None,
    };

    let mut lines = Vec::new();
    let mut index = 0;
    for (group, categories) in round.offered() {
        lines.push(Line::from(Span::styled(
            group.to_string(),
            bold().fg(Color::Cyan),
        )));

        let mut spans: Vec<Span> = Vec::new();
        let mut used = 0usize;
        for category in categories {
            let label = category.label();
            let text = format!(
                "[{}] {}",
                if round.is_selected(&label) { "x" } else { " " },
                label
            );

            let mut style = match result.and_then(|r| r.verdict_for(&label)) {
                Some(true) => bold().fg(Color::Green),
                Some(false) => bold().fg(Color::Red),
                None if round.is_selected(&label) => bold(),
                None => Style::default(),
            };
            if index == app.cursor {
                style = style.add_modifier(Modifier::UNDERLINED);
            }

            let needed = text.width() + LABEL_GAP.width();
            if used > 0 && used + needed > width as usize {
                lines.push(Line::from(std::mem::take(&mut spans)));
                used = 0;
            }
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(LABEL_GAP));
            used += needed;
            index += 1;
        }
        if !spans.is_empty() {
            lines.push(Line::from(spans));
        }
    }
    lines
}

fn render_finished(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(outcome) = app.session.outcome() else {
        return;
    };
    let colour = if outcome.won { Color::Green } else { Color::Magenta };

    let mut lines = vec![
        Line::from(Span::styled(outcome.message(), bold().fg(colour))),
        Line::from(format!("Final Score: {}", outcome.final_score)),
    ];
    if let Some(result) = app.session.last_result() {
        lines.push(Line::from(Span::styled(
            format!("Last round ({}): {}", result.number, result.summary()),
            dim(),
        )));
    }
    lines.push(Line::default());
    lines.push(Line::from("(r)etry · enter menu · (q)uit"));

    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(top), Constraint::Min(0)])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}
