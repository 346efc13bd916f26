use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::SnapshotSource;
use super::error::FetchError;
use crate::models::ResultSnapshot;

pub const LATEST_RESULT_PATH: &str = "/api/results/latest";

/// Reads the latest snapshot over HTTP. Holds no state besides the client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), LATEST_RESULT_PATH),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SnapshotSource for HttpFetcher {
    async fn fetch(&self) -> Result<Option<ResultSnapshot>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(url = %self.url, "no result published yet");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        match ResultSnapshot::from_json(&body) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                debug!(url = %self.url, error = %e, "ignoring malformed result body");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::test_support::serve;
    use axum::{Router, http::StatusCode as AxumStatus, routing::get};

    const BODY: &str = r#"{"timestamp":"2026-10-19T07:30:00Z","total_tests":2,"passed_tests":2,
        "failed_tests":0,"skipped_tests":0,"duration":0.3,"success":true,
        "packages":{"core":{"name":"core","status":"PASS","coverage":91.5,"tests":[]}},
        "issues":["main.go:12: unreachable code"]}"#;

    fn fetcher(base: &str) -> HttpFetcher {
        HttpFetcher::new(Client::new(), base)
    }

    #[test]
    fn test_url_joins_base_without_double_slash() {
        assert_eq!(
            fetcher("http://localhost:8080/").url(),
            "http://localhost:8080/api/results/latest"
        );
    }

    #[tokio::test]
    async fn test_fetch_returns_snapshot() {
        let base = serve(Router::new().route(LATEST_RESULT_PATH, get(|| async { BODY }))).await;
        let snap = fetcher(&base).fetch().await.unwrap().unwrap();
        assert_eq!(snap.total_tests, 2);
        assert!(snap.success);
        assert_eq!(snap.issues, vec!["main.go:12: unreachable code"]);
        assert_eq!(snap.package("core").unwrap().coverage, 91.5);
    }

    #[tokio::test]
    async fn test_not_found_is_absent() {
        let base = serve(Router::new().route(
            LATEST_RESULT_PATH,
            get(|| async { AxumStatus::NOT_FOUND }),
        ))
        .await;
        assert!(fetcher(&base).fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_null_body_is_absent() {
        let base = serve(Router::new().route(LATEST_RESULT_PATH, get(|| async { "null" }))).await;
        assert!(fetcher(&base).fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_absent() {
        let base = serve(Router::new().route(
            LATEST_RESULT_PATH,
            get(|| async { "{\"total_tests\": \"lots\"" }),
        ))
        .await;
        assert!(fetcher(&base).fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error() {
        let base = serve(Router::new().route(
            LATEST_RESULT_PATH,
            get(|| async { AxumStatus::INTERNAL_SERVER_ERROR }),
        ))
        .await;
        let err = fetcher(&base).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher(&format!("http://{}", addr)).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
