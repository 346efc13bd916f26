use ratatui::{prelude::*, widgets::Paragraph};

use super::theme;
use crate::app::{App, Connection, View};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn key_hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(theme::YELLOW)),
        Span::raw(label),
    ]
}

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let [keys_area, state_area] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(44)]).areas(area);

    let hints: Vec<[Span; 2]> = if app.filter_active {
        vec![key_hint(" [esc]", " clear  "), key_hint("[enter]", " apply")]
    } else {
        let mut hints = vec![key_hint(" [tab]", " view  ")];
        if app.view == View::Packages {
            hints.push(key_hint("[l/h]", " expand  "));
            hints.push(key_hint("[L/H]", " all  "));
            hints.push(key_hint("[/]", " filter  "));
            hints.push(key_hint("[p]", " panel  "));
        }
        hints.push(key_hint("[r]", " refresh  "));
        hints.push(key_hint("[q]", " quit"));
        hints
    };
    let keys = Line::from(hints.into_iter().flatten().collect::<Vec<_>>());
    frame.render_widget(
        Paragraph::new(keys).style(Style::default().bg(theme::SURFACE0)),
        keys_area,
    );

    let mut spans = Vec::new();
    if app.engine.is_fetching() {
        let spinner = SPINNER_FRAMES[app.spinner_tick % SPINNER_FRAMES.len()];
        spans.push(Span::styled(
            format!("{spinner} "),
            Style::default().fg(theme::YELLOW),
        ));
    }

    let issues = app.issue_count();
    if issues > 0 {
        spans.push(Span::styled(
            format!("⚠ {issues} issues  "),
            Style::default().fg(theme::PEACH),
        ));
    }

    if let Some(updated) = app.last_update {
        spans.push(Span::styled(
            format!("updated {} ", updated.format("%H:%M:%S")),
            Style::default().fg(theme::OVERLAY0),
        ));
    } else if !app.engine.is_loaded() {
        spans.push(Span::styled("no data ", Style::default().fg(theme::OVERLAY0)));
    }

    let (dot, label, color) = match app.connection {
        Connection::Connecting => ("○", "connecting", theme::YELLOW),
        Connection::Live => ("●", "live", theme::GREEN),
        Connection::Reconnecting => ("○", "reconnecting", theme::RED),
    };
    spans.push(Span::styled(
        format!("{dot} {label} "),
        Style::default().fg(color),
    ));

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .right_aligned()
            .style(Style::default().bg(theme::SURFACE0)),
        state_area,
    );
}
