use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::theme;
use crate::app::App;

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(format!(" Issues ({}) ", app.issue_count()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::SURFACE2));

    app.issues.viewport = block.inner(area).height as usize;

    let issues = app.snapshot().map(|s| s.issues.as_slice()).unwrap_or_default();
    if issues.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "✔ No static analysis issues",
            Style::default().fg(theme::GREEN),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let start = app.issues.offset.min(issues.len());
    let end = (start + app.issues.viewport).min(issues.len());

    let items: Vec<ListItem> = issues[start..end]
        .iter()
        .enumerate()
        .map(|(view_i, issue)| {
            let item = ListItem::new(Line::from(vec![
                Span::styled("⚠ ", Style::default().fg(theme::PEACH)),
                Span::styled(issue.as_str(), Style::default().fg(theme::TEXT)),
            ]));
            if start + view_i == app.issues.selected {
                item.style(Style::default().bg(theme::SURFACE1))
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
