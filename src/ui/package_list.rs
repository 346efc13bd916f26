use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem},
};

use super::theme;
use crate::{
    app::{App, Panel, Row},
    models::{coverage_band, status_glyph},
};

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.active_panel == Panel::PackageList;
    let border_style = if focused {
        Style::default().fg(theme::BLUE)
    } else {
        Style::default().fg(theme::SURFACE2)
    };

    let block = Block::default()
        .title(" Packages ")
        .borders(Borders::ALL)
        .border_style(border_style);

    app.packages.viewport = block.inner(area).height as usize;

    let rows = app.visible_rows();
    let start = app.packages.offset.min(rows.len());
    let end = (start + app.packages.viewport).min(rows.len());

    let Some(snapshot) = app.snapshot() else {
        frame.render_widget(block, area);
        return;
    };

    let items: Vec<ListItem> = rows[start..end]
        .iter()
        .enumerate()
        .filter_map(|(view_i, row)| {
            let line = match row {
                Row::Package { name } => {
                    let package = snapshot.package(name)?;
                    let glyph = status_glyph(package.status);
                    let marker = if app.expansion.is_expanded(name) {
                        "▼ "
                    } else {
                        "▶ "
                    };
                    let band = coverage_band(package.coverage);
                    Line::from(vec![
                        Span::raw(marker),
                        Span::styled(format!("{} ", glyph.icon()), Style::default().fg(glyph.color())),
                        Span::raw(name.clone()),
                        Span::styled(
                            format!("  {:.1}%", package.coverage),
                            Style::default().fg(band.color()),
                        ),
                    ])
                }
                Row::Test { package, index } => {
                    let test = snapshot.package(package)?.tests.get(*index)?;
                    let glyph = status_glyph(test.status);
                    Line::from(vec![
                        Span::raw("    "),
                        Span::styled(format!("{} ", glyph.icon()), Style::default().fg(glyph.color())),
                        Span::raw(test.name.clone()),
                        Span::styled(
                            format!("  {:.3}s", test.duration),
                            Style::default().fg(theme::OVERLAY0),
                        ),
                    ])
                }
            };

            let item = ListItem::new(line);
            if start + view_i == app.packages.selected && focused {
                Some(item.style(Style::default().bg(theme::SURFACE1)))
            } else {
                Some(item)
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
