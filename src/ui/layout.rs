use ratatui::{
    prelude::*,
    widgets::{Paragraph, Tabs},
};

use crate::app::{App, View};

use super::{
    coverage, dashboard, detail_panel, issue_list, notifications, package_list, search_box,
    status_bar, theme,
};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let [tabs_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_tabs(frame, app, tabs_area);

    if app.snapshot().is_none() {
        draw_waiting(frame, app, main_area);
    } else {
        match app.view {
            View::Dashboard => dashboard::draw(frame, app, main_area),
            View::Packages => draw_packages(frame, app, main_area),
            View::Coverage => coverage::draw(frame, app, main_area),
            View::Issues => issue_list::draw(frame, app, main_area),
        }
    }

    status_bar::draw(frame, app, status_area);
    notifications::draw(frame, app);
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = View::ALL.iter().enumerate().map(|(i, view)| {
        let title = match view {
            View::Issues if app.issue_count() > 0 => {
                format!(" {} {} ({}) ", i + 1, view.title(), app.issue_count())
            }
            _ => format!(" {} {} ", i + 1, view.title()),
        };
        Line::from(title)
    });

    let tabs = Tabs::new(titles)
        .select(app.view.index())
        .style(Style::default().fg(theme::OVERLAY0))
        .highlight_style(Style::default().fg(theme::BLUE).bold())
        .divider("│");
    frame.render_widget(tabs, area);
}

fn draw_packages(frame: &mut Frame, app: &mut App, area: Rect) {
    let [left_area, right_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

    if app.filter_active || !app.filter.value().is_empty() {
        let [search_area, list_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(left_area);
        search_box::draw(frame, &app.filter, app.filter_active, search_area);
        package_list::draw(frame, app, list_area);
    } else {
        package_list::draw(frame, app, left_area);
    }
    detail_panel::draw(frame, app, right_area);
}

fn draw_waiting(frame: &mut Frame, app: &App, area: Rect) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(area);

    let text = Text::from(vec![
        Line::from(Span::styled(
            "No tests run yet",
            Style::default().fg(theme::TEXT).bold(),
        )),
        Line::from(Span::styled(
            format!("Waiting for a run on {}", app.server_url),
            Style::default().fg(theme::OVERLAY0),
        )),
    ]);
    frame.render_widget(Paragraph::new(text).centered(), middle);
}
