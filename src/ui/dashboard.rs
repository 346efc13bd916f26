use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph},
};

use super::theme;
use crate::{
    app::App,
    models::{ResultSnapshot, coverage_band, success_rate},
    sync::TrendHistory,
};

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = app.snapshot() else {
        return;
    };

    let [cards_area, body_area] =
        Layout::vertical([Constraint::Length(4), Constraint::Min(1)]).areas(area);
    let [chart_area, activity_area] =
        Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
            .areas(body_area);

    draw_cards(frame, snapshot, cards_area);
    draw_trend(frame, app.engine.history(), chart_area);
    draw_activity(frame, app.engine.history(), activity_area);
}

fn draw_cards(frame: &mut Frame, snapshot: &ResultSnapshot, area: Rect) {
    let areas: [Rect; 4] = Layout::horizontal([Constraint::Fill(1); 4]).areas(area);

    let rate = success_rate(snapshot.total_tests, snapshot.passed_tests) * 100.0;
    let run_color = if snapshot.success {
        theme::GREEN
    } else {
        theme::RED
    };
    let (coverage_text, coverage_color) = match snapshot.average_coverage() {
        Some(avg) => (format!("{avg:.1}%"), coverage_band(avg).color()),
        None => ("n/a".to_string(), theme::OVERLAY0),
    };

    let cards = [
        (
            "Total Tests",
            snapshot.total_tests.to_string(),
            format!("{:.2}s", snapshot.duration),
            theme::BLUE,
        ),
        (
            "Passed",
            snapshot.passed_tests.to_string(),
            format!("{rate:.1}% success"),
            theme::GREEN,
        ),
        (
            "Failed",
            snapshot.failed_tests.to_string(),
            format!("{} skipped", snapshot.skipped_tests),
            if snapshot.failed_tests > 0 {
                theme::RED
            } else {
                theme::SUBTEXT0
            },
        ),
        (
            "Coverage",
            coverage_text,
            format!("{} packages", snapshot.packages.len()),
            coverage_color,
        ),
    ];

    for ((title, value, detail, color), card_area) in cards.into_iter().zip(areas) {
        let block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(run_color));
        let text = Text::from(vec![
            Line::from(Span::styled(value, Style::default().fg(color).bold())),
            Line::from(Span::styled(detail, Style::default().fg(theme::OVERLAY0))),
        ]);
        frame.render_widget(Paragraph::new(text).block(block), card_area);
    }
}

fn draw_trend(frame: &mut Frame, history: &TrendHistory, area: Rect) {
    let block = Block::default()
        .title(" Execution Trend ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::SURFACE2));

    let pass: Vec<(f64, f64)> = history
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.pass as f64))
        .collect();
    let fail: Vec<(f64, f64)> = history
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.fail as f64))
        .collect();

    let datasets = vec![
        Dataset::default()
            .name("pass")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::GREEN))
            .data(&pass),
        Dataset::default()
            .name("fail")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::RED))
            .data(&fail),
    ];

    let x_max = history.len().saturating_sub(1).max(1) as f64;
    let y_max = history.peak().max(1) as f64;
    let first = history.iter().next().map(|p| p.label.clone()).unwrap_or_default();
    let last = history.latest().map(|p| p.label.clone()).unwrap_or_default();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(theme::OVERLAY0))
                .bounds([0.0, x_max])
                .labels([first, last]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme::OVERLAY0))
                .bounds([0.0, y_max])
                .labels(["0".to_string(), format!("{}", history.peak())]),
        );
    frame.render_widget(chart, area);
}

fn draw_activity(frame: &mut Frame, history: &TrendHistory, area: Rect) {
    let block = Block::default()
        .title(" Recent Activity ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::SURFACE2));

    let items: Vec<ListItem> = history
        .iter()
        .rev()
        .map(|point| {
            let (icon, color) = if point.fail == 0 {
                ("✔", theme::GREEN)
            } else {
                ("✘", theme::RED)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{icon} "), Style::default().fg(color)),
                Span::styled(point.label.clone(), Style::default().fg(theme::SUBTEXT0)),
                Span::styled(format!("  {} passed", point.pass), Style::default().fg(theme::GREEN)),
                Span::styled(format!("  {} failed", point.fail), Style::default().fg(theme::RED)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
