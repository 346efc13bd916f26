use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_input::{Input, InputRequest};

use crate::app::{App, Panel, Row, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PreviousView,
    ShowView(View),
    FocusNext,
    NavigateUp,
    NavigateDown,
    ScrollUp,
    ScrollDown,
    Toggle,
    Collapse,
    ExpandAll,
    CollapseAll,
    JumpToStart,
    JumpToEnd,
    Refresh,
    FilterEnter,
    FilterInput(char),
    FilterBackspace,
    FilterExit,
    FilterApply,
}

/// Process a keyboard action.
pub fn handle_action(app: &mut App, action: Action) {
    match action {
        Action::Quit => app.should_quit = true,

        Action::NextView => app.view = app.view.next(),

        Action::PreviousView => app.view = app.view.previous(),

        Action::ShowView(view) => app.view = view,

        Action::FocusNext => {
            if app.view == View::Packages {
                app.active_panel = match app.active_panel {
                    Panel::PackageList => Panel::Detail,
                    Panel::Detail => Panel::PackageList,
                };
            }
        }

        Action::NavigateUp => move_selection(app, Step::Up(1)),

        Action::NavigateDown => move_selection(app, Step::Down(1)),

        Action::ScrollUp => {
            let half = (app.packages.viewport / 2).max(1);
            move_selection(app, Step::Up(half));
        }

        Action::ScrollDown => {
            let half = (app.packages.viewport / 2).max(1);
            move_selection(app, Step::Down(half));
        }

        Action::JumpToStart => move_selection(app, Step::Start),

        Action::JumpToEnd => move_selection(app, Step::End),

        Action::Toggle => {
            if app.view == View::Packages
                && app.active_panel == Panel::PackageList
                && let Some(Row::Package { name }) = app.selected_row()
            {
                app.expansion.toggle(&name);
                app.detail_scroll_offset = 0;
            }
        }

        Action::Collapse => {
            if app.view == View::Packages
                && app.active_panel == Panel::PackageList
                && let Some(row) = app.selected_row()
            {
                let name = row.package().to_string();
                if app.expansion.is_expanded(&name) {
                    app.expansion.toggle(&name);
                }
                // Collapsing from a test row moves the selection up to its package.
                app.restore_selection(Some(Row::Package { name }));
                app.detail_scroll_offset = 0;
            }
        }

        Action::ExpandAll => {
            if app.view == View::Packages {
                let names: Vec<String> =
                    app.visible_packages().iter().map(|p| p.name.clone()).collect();
                app.expansion.expand_all(names.iter().map(String::as_str));
            }
        }

        Action::CollapseAll => {
            if app.view == View::Packages {
                let previous = app.selected_row().map(|row| Row::Package {
                    name: row.package().to_string(),
                });
                app.expansion.collapse_all();
                app.restore_selection(previous);
            }
        }

        Action::Refresh => {
            if app.engine.on_trigger().is_some() {
                app.notifier
                    .info("Refreshing…", std::time::Duration::from_secs(1));
            }
        }

        Action::FilterEnter => {
            if app.view == View::Packages {
                app.filter_active = true;
                app.active_panel = Panel::PackageList;
            }
        }

        Action::FilterInput(c) => {
            app.filter.handle(InputRequest::InsertChar(c));
            app.packages.home();
        }

        Action::FilterBackspace => {
            app.filter.handle(InputRequest::DeletePrevChar);
            app.packages.home();
        }

        Action::FilterExit => {
            app.filter = Input::default();
            app.filter_active = false;
            app.packages.home();
        }

        Action::FilterApply => {
            app.filter_active = false;
        }
    }
}

enum Step {
    Up(usize),
    Down(usize),
    Start,
    End,
}

fn move_selection(app: &mut App, step: Step) {
    match (app.view, app.active_panel) {
        (View::Packages, Panel::Detail) => {
            app.detail_scroll_offset = match step {
                Step::Up(n) => app.detail_scroll_offset.saturating_sub(n as u16),
                Step::Down(n) => app.detail_scroll_offset.saturating_add(n as u16),
                Step::Start => 0,
                Step::End => u16::MAX,
            };
        }
        (View::Packages, Panel::PackageList) => {
            let len = app.visible_rows().len();
            step_cursor(&mut app.packages, step, len);
            app.detail_scroll_offset = 0;
        }
        (View::Coverage, _) => {
            let len = app.snapshot().map(|s| s.packages.len()).unwrap_or(0);
            step_cursor(&mut app.coverage, step, len);
        }
        (View::Issues, _) => {
            let len = app.issue_count();
            step_cursor(&mut app.issues, step, len);
        }
        (View::Dashboard, _) => {}
    }
}

fn step_cursor(cursor: &mut super::ListCursor, step: Step, len: usize) {
    match step {
        Step::Up(n) => cursor.up(n),
        Step::Down(n) => cursor.down(n, len),
        Step::Start => cursor.home(),
        Step::End => cursor.end(len),
    }
}

pub fn trigger_action(key: KeyEvent, filter_active: bool) -> Option<Action> {
    if filter_active {
        match key.code {
            KeyCode::Esc => Some(Action::FilterExit),
            KeyCode::Enter => Some(Action::FilterApply),
            KeyCode::Backspace => Some(Action::FilterBackspace),
            KeyCode::Up => Some(Action::NavigateUp),
            KeyCode::Down => Some(Action::NavigateDown),
            KeyCode::Char(c) => Some(Action::FilterInput(c)),
            _ => None,
        }
    } else {
        map_key(key)
    }
}

fn map_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('u') => Some(Action::ScrollUp),
            KeyCode::Char('d') => Some(Action::ScrollDown),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PreviousView),
        KeyCode::Char('1') => Some(Action::ShowView(View::Dashboard)),
        KeyCode::Char('2') => Some(Action::ShowView(View::Packages)),
        KeyCode::Char('3') => Some(Action::ShowView(View::Coverage)),
        KeyCode::Char('4') => Some(Action::ShowView(View::Issues)),
        KeyCode::Char('p') => Some(Action::FocusNext),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::NavigateUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::NavigateDown),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => Some(Action::Toggle),
        KeyCode::Char('L') => Some(Action::ExpandAll),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::Collapse),
        KeyCode::Char('H') => Some(Action::CollapseAll),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::JumpToStart),
        KeyCode::Char('G') | KeyCode::End => Some(Action::JumpToEnd),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('f') | KeyCode::Char('/') => Some(Action::FilterEnter),
        KeyCode::PageUp => Some(Action::ScrollUp),
        KeyCode::PageDown => Some(Action::ScrollDown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::test_support::{EmptySource, sample_snapshot};
    use crate::sync::FetchCompletion;

    fn packages_app() -> App {
        let (mut app, _rx) = App::new("http://localhost:8080".into(), Arc::new(EmptySource));
        app.engine.apply(FetchCompletion {
            seq: 1,
            outcome: Ok(Some(sample_snapshot())),
        });
        handle_action(&mut app, Action::ShowView(View::Packages));
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(trigger_action(key(KeyCode::Char('q')), false), Some(Action::Quit));
        assert_eq!(trigger_action(key(KeyCode::Char('r')), false), Some(Action::Refresh));
        assert_eq!(
            trigger_action(key(KeyCode::Char('3')), false),
            Some(Action::ShowView(View::Coverage))
        );
        assert_eq!(
            trigger_action(key(KeyCode::Char('q')), true),
            Some(Action::FilterInput('q'))
        );
        assert_eq!(
            trigger_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), false),
            Some(Action::Quit)
        );
    }

    #[tokio::test]
    async fn test_toggle_expands_selected_package() {
        let mut app = packages_app();
        handle_action(&mut app, Action::NavigateDown);
        handle_action(&mut app, Action::Toggle);
        assert!(app.expansion.is_expanded("pkgB"));
        assert_eq!(app.visible_rows().len(), 4);

        handle_action(&mut app, Action::Toggle);
        assert!(!app.expansion.is_expanded("pkgB"));
    }

    #[tokio::test]
    async fn test_collapse_from_test_row_selects_package() {
        let mut app = packages_app();
        handle_action(&mut app, Action::Toggle);
        handle_action(&mut app, Action::NavigateDown);
        assert!(matches!(app.selected_row(), Some(Row::Test { .. })));

        handle_action(&mut app, Action::Collapse);
        assert!(!app.expansion.is_expanded("pkgA"));
        assert_eq!(app.selected_row(), Some(Row::Package { name: "pkgA".into() }));
    }

    #[tokio::test]
    async fn test_expand_all_then_collapse_all() {
        let mut app = packages_app();
        handle_action(&mut app, Action::ExpandAll);
        assert_eq!(app.visible_rows().len(), 5);
        handle_action(&mut app, Action::JumpToEnd);
        handle_action(&mut app, Action::CollapseAll);
        assert_eq!(app.visible_rows().len(), 2);
        assert_eq!(app.selected_row(), Some(Row::Package { name: "pkgB".into() }));
    }

    #[tokio::test]
    async fn test_toggle_ignored_outside_packages_view() {
        let mut app = packages_app();
        handle_action(&mut app, Action::ShowView(View::Dashboard));
        handle_action(&mut app, Action::Toggle);
        assert!(!app.expansion.is_expanded("pkgA"));
    }

    #[tokio::test]
    async fn test_filter_input_and_exit() {
        let mut app = packages_app();
        handle_action(&mut app, Action::FilterEnter);
        assert!(app.filter_active);
        for c in "pkgb".chars() {
            handle_action(&mut app, Action::FilterInput(c));
        }
        assert_eq!(app.visible_rows().len(), 1);
        handle_action(&mut app, Action::FilterBackspace);
        assert_eq!(app.filter.value(), "pkg");
        handle_action(&mut app, Action::FilterExit);
        assert!(!app.filter_active);
        assert_eq!(app.visible_rows().len(), 2);
    }

    #[tokio::test]
    async fn test_navigation_clamps_to_rows() {
        let mut app = packages_app();
        for _ in 0..10 {
            handle_action(&mut app, Action::NavigateDown);
        }
        assert_eq!(app.packages.selected, 1);
        handle_action(&mut app, Action::JumpToStart);
        assert_eq!(app.packages.selected, 0);
    }

    #[tokio::test]
    async fn test_issue_navigation() {
        let mut app = packages_app();
        handle_action(&mut app, Action::ShowView(View::Issues));
        handle_action(&mut app, Action::NavigateDown);
        assert_eq!(app.issues.selected, 0);
    }

    #[tokio::test]
    async fn test_refresh_starts_fetch() {
        let mut app = packages_app();
        handle_action(&mut app, Action::Refresh);
        assert!(app.engine.is_fetching());
    }
}
