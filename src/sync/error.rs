use thiserror::Error;

/// Failure to obtain a snapshot. "No run yet" is not an error and never
/// shows up here.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Listener-level failure. Always handled by reconnecting.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("failed to connect to event stream: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("event stream answered with status {0}")]
    Status(u16),

    #[error("event stream read failed: {0}")]
    Read(#[source] reqwest::Error),

    #[error("event stream closed by server")]
    Closed,

    #[error("event stream line exceeded {0} bytes")]
    LineTooLong(usize),
}
