//! Subscription to the server's `/api/events` stream.
//!
//! Every event the server pushes is treated as "a new result may exist"; the
//! payload is never read. The stream is reconnected after any failure using
//! the server-sent-events retry delay.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::StreamError;

pub const EVENTS_PATH: &str = "/api/events";

/// Reconnect delay used until the server sends a `retry:` field.
pub const DEFAULT_RETRY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerSignal {
    Connected,
    Trigger,
    Disconnected,
}

type Callback = Box<dyn Fn(ListenerSignal) + Send>;

/// Callback slot shared between the handle and the stream task. Emission and
/// `close` both hold the lock, so no signal can be delivered after `close`.
#[derive(Clone)]
struct Dispatcher(Arc<Mutex<Option<Callback>>>);

impl Dispatcher {
    fn slot(&self) -> MutexGuard<'_, Option<Callback>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns `false` once the listener has been closed.
    fn emit(&self, signal: ListenerSignal) -> bool {
        match self.slot().as_ref() {
            Some(callback) => {
                callback(signal);
                true
            }
            None => false,
        }
    }

    fn clear(&self) {
        self.slot().take();
    }

    fn is_cleared(&self) -> bool {
        self.slot().is_none()
    }
}

pub struct NotificationListener {
    client: Client,
    url: String,
    retry: Duration,
}

impl NotificationListener {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), EVENTS_PATH),
            retry: DEFAULT_RETRY,
        }
    }

    pub fn with_retry(mut self, retry: Duration) -> Self {
        self.retry = retry;
        self
    }

    /// Start listening. The callback runs on the listener task for every
    /// signal until the returned handle is closed or dropped.
    pub fn spawn<F>(self, callback: F) -> ListenerHandle
    where
        F: Fn(ListenerSignal) + Send + 'static,
    {
        let dispatcher = Dispatcher(Arc::new(Mutex::new(Some(Box::new(callback)))));
        let task = tokio::spawn(self.run(dispatcher.clone()));
        ListenerHandle {
            dispatcher,
            task: Some(task),
        }
    }

    async fn run(mut self, dispatcher: Dispatcher) {
        loop {
            match self.stream_once(&dispatcher).await {
                Ok(()) => break,
                Err(e) => {
                    warn!(url = %self.url, error = %e, retry_ms = self.retry.as_millis() as u64, "event stream dropped");
                    if !dispatcher.emit(ListenerSignal::Disconnected) {
                        break;
                    }
                }
            }
            tokio::time::sleep(self.retry).await;
        }
        debug!(url = %self.url, "listener stopped");
    }

    /// Consume one connection. Returns `Ok` only when the listener was closed.
    async fn stream_once(&mut self, dispatcher: &Dispatcher) -> Result<(), StreamError> {
        let response = self
            .client
            .get(&self.url)
            .header("accept", "text/event-stream")
            .header("cache-control", "no-cache")
            .send()
            .await
            .map_err(StreamError::Connect)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status(status.as_u16()));
        }

        info!(url = %self.url, "event stream connected");
        if !dispatcher.emit(ListenerSignal::Connected) {
            return Ok(());
        }

        let mut decoder = SseDecoder::default();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(StreamError::Read)?;
            for item in decoder.feed(&chunk)? {
                match item {
                    SseItem::Event => {
                        debug!("result notification received");
                        if !dispatcher.emit(ListenerSignal::Trigger) {
                            return Ok(());
                        }
                    }
                    SseItem::Retry(retry) => self.retry = retry,
                }
            }
        }
        Err(StreamError::Closed)
    }
}

/// Owner of a running subscription.
pub struct ListenerHandle {
    dispatcher: Dispatcher,
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Stop listening. Idempotent; the callback is never invoked after this
    /// returns.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        self.dispatcher.clear();
        if let Some(task) = self.task.take() {
            task.abort();
            info!("event listener closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.dispatcher.is_cleared()
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SseItem {
    Event,
    Retry(Duration),
}

/// Longest line the decoder buffers before giving up on the connection.
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Incremental `text/event-stream` parser. Only tracks whether an event
/// carried data and any `retry:` hints. Lines end in CRLF, LF or a lone CR.
#[derive(Default)]
struct SseDecoder {
    pending: Vec<u8>,
    has_data: bool,
    after_cr: bool,
}

impl SseDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseItem>, StreamError> {
        let mut items = Vec::new();
        for &byte in chunk {
            // LF completing a CRLF pair, possibly split across chunks.
            if std::mem::take(&mut self.after_cr) && byte == b'\n' {
                continue;
            }
            match byte {
                b'\r' | b'\n' => {
                    self.after_cr = byte == b'\r';
                    let raw = std::mem::take(&mut self.pending);
                    let line = String::from_utf8_lossy(&raw);
                    if let Some(item) = self.line(&line) {
                        items.push(item);
                    }
                }
                _ if self.pending.len() >= MAX_LINE_BYTES => {
                    return Err(StreamError::LineTooLong(MAX_LINE_BYTES));
                }
                _ => self.pending.push(byte),
            }
        }
        Ok(items)
    }

    fn line(&mut self, line: &str) -> Option<SseItem> {
        if line.is_empty() {
            return std::mem::take(&mut self.has_data).then_some(SseItem::Event);
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => {
                self.has_data = true;
                None
            }
            "retry" => value
                .parse::<u64>()
                .ok()
                .map(|ms| SseItem::Retry(Duration::from_millis(ms))),
            _ => None,
        }
    }
}
