use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph},
};

use super::theme;
use crate::{
    app::App,
    models::{PackageResult, coverage_band},
};

const ROW_HEIGHT: u16 = 1;

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(" Coverage ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::SURFACE2));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [summary_area, rows_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).areas(inner);

    app.coverage.viewport = (rows_area.height / ROW_HEIGHT) as usize;

    let Some(snapshot) = app.snapshot() else {
        return;
    };

    let summary = match snapshot.average_coverage() {
        Some(avg) => Line::from(vec![
            Span::styled("Average ", Style::default().fg(theme::OVERLAY0)),
            Span::styled(
                format!("{avg:.1}%"),
                Style::default().fg(coverage_band(avg).color()).bold(),
            ),
        ]),
        None => Line::from(Span::styled(
            "No coverage measured",
            Style::default().fg(theme::OVERLAY0),
        )),
    };
    frame.render_widget(Paragraph::new(summary), summary_area);

    let packages = snapshot.sorted_packages();
    let start = app.coverage.offset.min(packages.len());
    let end = (start + app.coverage.viewport).min(packages.len());
    let name_width = packages
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(40) as u16
        + 2;

    for (view_i, package) in packages[start..end].iter().enumerate() {
        let row_area = Rect {
            y: rows_area.y + view_i as u16 * ROW_HEIGHT,
            height: ROW_HEIGHT,
            ..rows_area
        };
        let selected = start + view_i == app.coverage.selected;
        draw_row(frame, package, selected, name_width, row_area);
    }
}

fn draw_row(frame: &mut Frame, package: &PackageResult, selected: bool, name_width: u16, area: Rect) {
    let [name_area, gauge_area] =
        Layout::horizontal([Constraint::Length(name_width), Constraint::Min(10)]).areas(area);

    let name_style = if selected {
        Style::default().fg(theme::TEXT).bg(theme::SURFACE1)
    } else {
        Style::default().fg(theme::SUBTEXT0)
    };
    frame.render_widget(Paragraph::new(package.name.as_str()).style(name_style), name_area);

    let band = coverage_band(package.coverage);
    // Gauge panics outside [0, 1].
    let ratio = if package.coverage.is_finite() {
        (package.coverage / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(band.color()).bg(theme::SURFACE0))
        .ratio(ratio)
        .label(format!("{:.1}% {}", package.coverage, band.label()));
    frame.render_widget(gauge, gauge_area);
}
