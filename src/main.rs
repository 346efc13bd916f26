mod app;
mod config;
mod models;
mod sync;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use futures_util::StreamExt;
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior, interval, interval_at};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::{App, handle_action, handle_completion, handle_listener_signal, trigger_action};
use config::Config;
use models::ResultSnapshot;
use sync::{HttpFetcher, NotificationListener};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    // Setup terminal
    terminal::enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal).await;

    // Teardown terminal
    terminal::disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result
}

/// Log to the file named by `TESTRIDER_LOG`; the terminal belongs to the UI.
fn init_logging() {
    let Some(file) = std::env::var("TESTRIDER_LOG").ok().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    }) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::load(&cwd);
    let server_url = std::env::args().nth(1).unwrap_or(config.server.url);

    let client = reqwest::Client::builder()
        .connect_timeout(config.sync.connect_timeout())
        .build()
        .context("failed to build HTTP client")?;

    let fetcher = HttpFetcher::new(client.clone(), &server_url);
    info!(url = fetcher.url(), "starting dashboard");

    let (mut app, mut completion_rx) = App::new(server_url.clone(), Arc::new(fetcher));
    let mut snapshots = app.engine.subscribe();

    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
    let mut listener = NotificationListener::new(client, &server_url)
        .with_retry(config.sync.reconnect_delay())
        .spawn(move |signal| {
            let _ = signal_tx.send(signal);
        });

    // The stream only announces new runs; load whatever already exists.
    app.engine.on_trigger();

    let mut poll = config.sync.poll_interval().map(|period| {
        let mut poll = interval_at(Instant::now() + period, period);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        poll
    });
    let mut tick = interval(Duration::from_millis(100));
    let mut event_stream = EventStream::new();

    loop {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    None => break,
                    Some(Err(e)) => return Err(e.into()),
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = trigger_action(key, app.filter_active) {
                            handle_action(&mut app, action);
                        }
                    }
                    Some(Ok(_)) => {}
                }
            }

            Some(completion) = completion_rx.recv() => {
                handle_completion(&mut app, completion);
            }

            Some(signal) = signal_rx.recv() => {
                handle_listener_signal(&mut app, signal);
            }

            Ok(()) = snapshots.changed() => {
                let latest = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    update_title(&mut io::stdout(), &snapshot);
                }
            }

            _ = next_poll(&mut poll) => {
                app.engine.on_trigger();
            }

            _ = tick.tick() => {
                if app.engine.is_fetching() {
                    app.spinner_tick = app.spinner_tick.wrapping_add(1);
                }
                app.notifier.prune_expired();
            }
        }

        if app.should_quit {
            break;
        }
    }

    listener.close();
    app.dispose();
    info!(stats = ?app.engine.stats(), "dashboard closed");

    Ok(())
}

/// Cosmetic; a failed write is logged and the session carries on.
fn update_title(out: &mut impl io::Write, snapshot: &ResultSnapshot) {
    let title = format!(
        "testrider {}/{} passing",
        snapshot.passed_tests, snapshot.total_tests
    );
    if let Err(e) = out.execute(SetTitle(title)) {
        warn!(error = %e, "failed to update terminal title");
    }
}

async fn next_poll(poll: &mut Option<Interval>) {
    match poll {
        Some(poll) => {
            poll.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::sample_snapshot;

    struct BrokenPipe;

    impl io::Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_update_title_writes_pass_count() {
        let mut out = Vec::new();
        update_title(&mut out, &sample_snapshot());
        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("testrider 7/10 passing"));
    }

    #[test]
    fn test_update_title_survives_write_failure() {
        update_title(&mut BrokenPipe, &sample_snapshot());
    }
}
