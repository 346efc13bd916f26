use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::{
    app::{expansion::ExpansionState, notifier::Notifier},
    models::{PackageResult, ResultSnapshot},
    sync::{FetchCompletion, SnapshotSource, SyncEngine},
};

pub mod actions;
pub mod events;
pub mod expansion;
pub mod notifier;

pub use actions::{Action, handle_action, trigger_action};
pub use events::{handle_completion, handle_listener_signal};
pub use notifier::NotificationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Packages,
    Coverage,
    Issues,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Packages, View::Coverage, View::Issues];

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Packages => "Packages",
            View::Coverage => "Coverage",
            View::Issues => "Issues",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> View {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> View {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    PackageList,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Connecting,
    Live,
    Reconnecting,
}

/// A line in the package list: a package, or one of its tests when expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Package { name: String },
    Test { package: String, index: usize },
}

impl Row {
    pub fn package(&self) -> &str {
        match self {
            Row::Package { name } => name,
            Row::Test { package, .. } => package,
        }
    }
}

/// Selection plus scroll window over a list whose length can change under it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListCursor {
    pub selected: usize,
    pub offset: usize,
    pub viewport: usize,
}

impl ListCursor {
    pub fn up(&mut self, by: usize) {
        self.selected = self.selected.saturating_sub(by);
        self.adjust();
    }

    pub fn down(&mut self, by: usize, len: usize) {
        self.selected = (self.selected + by).min(len.saturating_sub(1));
        self.adjust();
    }

    pub fn home(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    pub fn end(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
        self.adjust();
    }

    /// Keep the selection inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        self.offset = self.offset.min(self.selected);
        self.adjust();
    }

    fn adjust(&mut self) {
        if self.viewport == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + self.viewport {
            self.offset = self.selected + 1 - self.viewport;
        }
    }
}

pub struct App {
    pub server_url: String,
    pub engine: SyncEngine,
    pub expansion: ExpansionState,
    pub view: View,
    pub active_panel: Panel,
    pub packages: ListCursor,
    pub coverage: ListCursor,
    pub issues: ListCursor,
    pub detail_scroll_offset: u16,
    pub filter_active: bool,
    pub filter: tui_input::Input,
    pub connection: Connection,
    pub last_update: Option<DateTime<Local>>,
    pub spinner_tick: usize,
    pub should_quit: bool,
    pub notifier: Notifier,
}

impl App {
    pub fn new(
        server_url: String,
        source: Arc<dyn SnapshotSource>,
    ) -> (Self, mpsc::UnboundedReceiver<FetchCompletion>) {
        let (engine, completion_rx) = SyncEngine::new(source);
        let app = Self {
            server_url,
            engine,
            expansion: ExpansionState::new(),
            view: View::Dashboard,
            active_panel: Panel::PackageList,
            packages: ListCursor::default(),
            coverage: ListCursor::default(),
            issues: ListCursor::default(),
            detail_scroll_offset: 0,
            filter_active: false,
            filter: tui_input::Input::default(),
            connection: Connection::Connecting,
            last_update: None,
            spinner_tick: 0,
            should_quit: false,
            notifier: Notifier::new(),
        };
        (app, completion_rx)
    }

    pub fn snapshot(&self) -> Option<&ResultSnapshot> {
        self.engine.current()
    }

    /// Packages in display order, narrowed by the filter query.
    pub fn visible_packages(&self) -> Vec<&PackageResult> {
        let Some(snapshot) = self.snapshot() else {
            return Vec::new();
        };
        let query = self.filter.value().to_lowercase();
        snapshot
            .sorted_packages()
            .into_iter()
            .filter(|p| query.is_empty() || p.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Flattened package list honoring expansion state.
    pub fn visible_rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for package in self.visible_packages() {
            rows.push(Row::Package {
                name: package.name.clone(),
            });
            if self.expansion.is_expanded(&package.name) {
                rows.extend((0..package.tests.len()).map(|index| Row::Test {
                    package: package.name.clone(),
                    index,
                }));
            }
        }
        rows
    }

    pub fn selected_row(&self) -> Option<Row> {
        self.visible_rows().get(self.packages.selected).cloned()
    }

    pub fn issue_count(&self) -> usize {
        self.snapshot().map(|s| s.issues.len()).unwrap_or(0)
    }

    /// Put the package selection back on `previous` after the rows changed,
    /// or clamp it if that row is gone.
    pub fn restore_selection(&mut self, previous: Option<Row>) {
        let rows = self.visible_rows();
        match previous.and_then(|row| rows.iter().position(|r| *r == row)) {
            Some(pos) => {
                self.packages.selected = pos;
                self.packages.clamp(rows.len());
            }
            None => self.packages.clamp(rows.len()),
        }
        let package_count = self.snapshot().map(|s| s.packages.len()).unwrap_or(0);
        self.coverage.clamp(package_count);
        self.issues.clamp(self.issue_count());
    }

    /// Release the session: the engine stops accepting results.
    pub fn dispose(&mut self) {
        self.engine.dispose();
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{EmptySource, sample_snapshot};
    use super::*;
    use crate::models::{CoverageBand, coverage_band};
    use crate::sync::{ApplyOutcome, FetchCompletion};

    fn loaded_app() -> App {
        let (mut app, _rx) = App::new("http://localhost:8080".into(), Arc::new(EmptySource));
        let outcome = app.engine.apply(FetchCompletion {
            seq: 1,
            outcome: Ok(Some(sample_snapshot())),
        });
        assert!(matches!(outcome, ApplyOutcome::Applied));
        app
    }

    #[tokio::test]
    async fn test_packages_sorted_and_banded() {
        let app = loaded_app();
        let packages = app.visible_packages();
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["pkgA", "pkgB"]);
        assert_eq!(coverage_band(packages[0].coverage), CoverageBand::High);
        assert_eq!(coverage_band(packages[1].coverage), CoverageBand::Low);
    }

    #[tokio::test]
    async fn test_rows_follow_expansion() {
        let mut app = loaded_app();
        assert_eq!(app.visible_rows().len(), 2);
        app.expansion.toggle("pkgB");
        assert_eq!(
            app.visible_rows(),
            vec![
                Row::Package { name: "pkgA".into() },
                Row::Package { name: "pkgB".into() },
                Row::Test { package: "pkgB".into(), index: 0 },
                Row::Test { package: "pkgB".into(), index: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_expansion_survives_snapshot_replacement() {
        let mut app = loaded_app();
        app.expansion.toggle("pkgA");
        app.engine.apply(FetchCompletion {
            seq: 2,
            outcome: Ok(Some(sample_snapshot())),
        });
        assert!(app.expansion.is_expanded("pkgA"));
        assert_eq!(app.visible_rows().len(), 3);
    }

    #[tokio::test]
    async fn test_filter_narrows_packages() {
        let mut app = loaded_app();
        app.filter = tui_input::Input::new("pkgb".into());
        let names: Vec<String> = app.visible_packages().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["pkgB"]);
    }

    #[tokio::test]
    async fn test_no_rows_before_first_snapshot() {
        let (app, _rx) = App::new("http://localhost:8080".into(), Arc::new(EmptySource));
        assert!(app.visible_rows().is_empty());
        assert!(app.selected_row().is_none());
        assert_eq!(app.issue_count(), 0);
    }

    #[tokio::test]
    async fn test_restore_selection_follows_row() {
        let mut app = loaded_app();
        app.packages.selected = 1;
        let previous = app.selected_row();
        app.expansion.toggle("pkgA");
        app.restore_selection(previous);
        assert_eq!(app.selected_row(), Some(Row::Package { name: "pkgB".into() }));
    }

    #[test]
    fn test_list_cursor_scrolls_with_selection() {
        let mut cursor = ListCursor {
            viewport: 3,
            ..Default::default()
        };
        cursor.down(5, 10);
        assert_eq!((cursor.selected, cursor.offset), (5, 3));
        cursor.up(4);
        assert_eq!((cursor.selected, cursor.offset), (1, 1));
        cursor.end(10);
        assert_eq!((cursor.selected, cursor.offset), (9, 7));
        cursor.clamp(2);
        assert_eq!(cursor.selected, 1);
        assert!(cursor.offset <= cursor.selected);
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Dashboard.next(), View::Packages);
        assert_eq!(View::Issues.next(), View::Dashboard);
        assert_eq!(View::Dashboard.previous(), View::Issues);
    }
}
