use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::theme;
use crate::app::{App, Panel, Row};
use crate::models::{PackageResult, StatusGlyph, TestCase, coverage_band, status_glyph};

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.active_panel == Panel::Detail;
    let border_style = if focused {
        Style::default().fg(theme::BLUE)
    } else {
        Style::default().fg(theme::SURFACE2)
    };

    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content = app
        .selected_row()
        .and_then(|row| {
            let snapshot = app.snapshot()?;
            let package = snapshot.package(row.package())?;
            Some(match row {
                Row::Package { .. } => package_text(package),
                Row::Test { index, .. } => test_text(package, package.tests.get(index)?),
            })
        })
        .unwrap_or_else(|| Text::from("Select a package to view details."));

    let max_scroll = (content.height() as u16).saturating_sub(inner.height);
    app.detail_scroll_offset = app.detail_scroll_offset.min(max_scroll);

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll_offset, 0));
    frame.render_widget(paragraph, inner);
}

fn package_text(package: &PackageResult) -> Text<'static> {
    let glyph = status_glyph(package.status);
    let band = coverage_band(package.coverage);
    let counts = package.counts();

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", glyph.icon()), Style::default().fg(glyph.color())),
            Span::styled(package.name.clone(), Style::default().fg(theme::TEXT).bold()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Coverage: ", Style::default().fg(theme::OVERLAY0)),
            Span::styled(
                format!("{:.1}% ({})", package.coverage, band.label()),
                Style::default().fg(band.color()),
            ),
        ]),
        Line::from(vec![
            Span::styled("Duration: ", Style::default().fg(theme::OVERLAY0)),
            Span::styled(format!("{:.3}s", package.duration), Style::default().fg(theme::MAUVE)),
        ]),
        Line::from(""),
        count_line(counts.passed, counts.failed),
    ];

    let failing: Vec<&TestCase> = package
        .tests
        .iter()
        .filter(|t| status_glyph(t.status) == StatusGlyph::Fail)
        .collect();
    for test in failing {
        lines.push(Line::from(""));
        lines.extend(test_header(test));
        lines.extend(output_lines(test));
    }

    Text::from(lines)
}

fn test_text(package: &PackageResult, test: &TestCase) -> Text<'static> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} > {}", package.name, test.name),
            Style::default().fg(theme::OVERLAY0).bold(),
        )),
        Line::from(""),
    ];
    lines.extend(test_header(test));
    let output = output_lines(test);
    if output.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "No output captured.",
            Style::default().fg(theme::OVERLAY0),
        )));
    } else {
        lines.extend(output);
    }
    Text::from(lines)
}

fn count_line(passed: usize, failed: usize) -> Line<'static> {
    let mut spans = Vec::new();
    for (glyph, n) in [
        (StatusGlyph::Pass, passed),
        (StatusGlyph::Fail, failed),
    ] {
        spans.push(Span::styled(
            format!("{} {}   ", glyph.icon(), n),
            Style::default().fg(glyph.color()),
        ));
    }
    Line::from(spans)
}

fn test_header(test: &TestCase) -> Vec<Line<'static>> {
    let glyph = status_glyph(test.status);
    vec![Line::from(vec![
        Span::styled(format!("{} ", glyph.icon()), Style::default().fg(glyph.color())),
        Span::styled(test.name.clone(), Style::default().fg(glyph.color()).bold()),
        Span::styled(
            format!("  {:.3}s", test.duration),
            Style::default().fg(theme::MAUVE),
        ),
    ])]
}

fn output_lines(test: &TestCase) -> Vec<Line<'static>> {
    if test.output.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("━━ Output ━━", Style::default().fg(theme::YELLOW))),
    ];
    // Producers may send either one entry per line or whole blocks.
    for chunk in &test.output {
        for text in chunk.lines() {
            let style = if text.contains("FAIL") || text.contains("panic") {
                Style::default().fg(theme::RED)
            } else {
                Style::default().fg(theme::SUBTEXT0)
            };
            lines.push(Line::from(Span::styled(text.to_string(), style)));
        }
    }
    lines
}
