use std::time::Duration;

use chrono::Local;
use tracing::debug;

use crate::{
    app::{App, Connection},
    sync::{ApplyOutcome, FetchCompletion, ListenerSignal},
};

const RECONNECTED_TTL: Duration = Duration::from_secs(2);

/// React to the notification stream.
pub fn handle_listener_signal(app: &mut App, signal: ListenerSignal) {
    match signal {
        ListenerSignal::Trigger => {
            app.engine.on_trigger();
        }

        ListenerSignal::Connected => {
            let was_down = app.connection == Connection::Reconnecting;
            app.connection = Connection::Live;
            if was_down {
                // Results may have been published while the stream was down.
                app.engine.on_trigger();
                app.notifier.info("Reconnected to server", RECONNECTED_TTL);
            }
        }

        ListenerSignal::Disconnected => {
            app.connection = Connection::Reconnecting;
        }
    }
}

/// Feed a finished fetch into the engine and refresh view state around it.
pub fn handle_completion(app: &mut App, completion: FetchCompletion) {
    let previous = app.selected_row();
    match app.engine.apply(completion) {
        ApplyOutcome::Applied => {
            app.last_update = Some(Local::now());
            app.restore_selection(previous);
        }
        ApplyOutcome::Failed(e) => {
            app.notifier.error(format!("Fetch failed: {e}"));
        }
        ApplyOutcome::Stale { seq, last_applied } => {
            debug!(seq, last_applied, "stale completion ignored");
        }
        ApplyOutcome::NoData | ApplyOutcome::Detached => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::{
        NotificationKind, Row,
        test_support::{EmptySource, sample_snapshot},
    };
    use crate::sync::FetchError;

    fn new_app() -> App {
        App::new("http://localhost:8080".into(), Arc::new(EmptySource)).0
    }

    fn snapshot_at(seq: u64) -> FetchCompletion {
        FetchCompletion {
            seq,
            outcome: Ok(Some(sample_snapshot())),
        }
    }

    #[tokio::test]
    async fn test_trigger_starts_fetch() {
        let mut app = new_app();
        handle_listener_signal(&mut app, ListenerSignal::Trigger);
        assert!(app.engine.is_fetching());
    }

    #[tokio::test]
    async fn test_connection_state_follows_signals() {
        let mut app = new_app();
        assert_eq!(app.connection, Connection::Connecting);

        handle_listener_signal(&mut app, ListenerSignal::Connected);
        assert_eq!(app.connection, Connection::Live);
        assert!(!app.engine.is_fetching());

        handle_listener_signal(&mut app, ListenerSignal::Disconnected);
        assert_eq!(app.connection, Connection::Reconnecting);
    }

    #[tokio::test]
    async fn test_reconnect_catches_up() {
        let mut app = new_app();
        handle_listener_signal(&mut app, ListenerSignal::Disconnected);
        handle_listener_signal(&mut app, ListenerSignal::Connected);
        assert!(app.engine.is_fetching());
        assert_eq!(app.notifier.recent().unwrap().kind, NotificationKind::Info);
    }

    #[tokio::test]
    async fn test_applied_completion_stamps_update_and_keeps_selection() {
        let mut app = new_app();
        handle_completion(&mut app, snapshot_at(1));
        assert!(app.last_update.is_some());

        app.packages.selected = 1;
        handle_completion(&mut app, snapshot_at(2));
        assert_eq!(app.selected_row(), Some(Row::Package { name: "pkgB".into() }));
    }

    #[tokio::test]
    async fn test_failed_completion_notifies() {
        let mut app = new_app();
        handle_completion(
            &mut app,
            FetchCompletion {
                seq: 1,
                outcome: Err(FetchError::Status {
                    url: "http://localhost:8080/api/results/latest".into(),
                    status: 500,
                }),
            },
        );
        let note = app.notifier.recent().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert!(note.message.contains("500"));
        assert!(app.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_stale_completion_leaves_update_time() {
        let mut app = new_app();
        handle_completion(&mut app, snapshot_at(4));
        let stamped = app.last_update;
        handle_completion(&mut app, snapshot_at(2));
        assert_eq!(app.last_update, stamped);
    }
}
