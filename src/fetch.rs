//! Concurrent feed fetching.
//!
//! [`fetch_all`] spawns one task per source, all at once, and then waits on the
//! join handles in source order.  `results[i]` therefore always belongs to
//! `sources[i]` no matter which request finishes first, and a failing (or
//! panicking) fetch only ever fills its own slot.
//!
//! The network side sits behind the [`Fetch`] trait; [`HttpFetcher`] is the
//! reqwest implementation used by the binary.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use thiserror::Error;
use tokio::task::JoinError;

use crate::source::Source;

/// Why a source's body could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connection, TLS or other transport failure.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// Anything but `200 OK`.  Displays as the status line, e.g. "404 Not Found".
    #[error("{0}")]
    HttpStatus(StatusCode),
    /// The status was fine but the body could not be read.
    #[error("while reading {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The fetch task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    Task(#[from] JoinError),
}

/// Retrieves the raw body behind a URL.
///
/// Implementations are shared between concurrently running tasks, hence the
/// `Send + Sync + 'static` bounds.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP GET over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher.  `timeout` bounds each whole request; `None` waits
    /// indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus(status));
        }

        response.text().await.map_err(|source| FetchError::BodyRead {
            url: url.to_string(),
            source,
        })
    }
}

/// Fetch every source concurrently and return the results in source order.
pub async fn fetch_all<F: Fetch>(
    fetcher: Arc<F>,
    sources: &[Source],
) -> Vec<Result<String, FetchError>> {
    let handles: Vec<_> = sources
        .iter()
        .map(|source| {
            let fetcher = Arc::clone(&fetcher);
            let name = source.name.clone();
            let url = source.url.clone();

            tokio::spawn(async move {
                tracing::debug!(source = %name, url = %url, "Fetching feed");
                let started = Instant::now();
                let result = fetcher.fetch(&url).await;

                match &result {
                    Ok(body) => tracing::debug!(
                        source = %name,
                        bytes = body.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Fetched feed"
                    ),
                    Err(e) => tracing::warn!(source = %name, url = %url, error = %e, "Fetch failed"),
                }
                result
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (source, handle) in sources.iter().zip(handles) {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(source = %source.name, error = %e, "Fetch task did not complete");
                Err(FetchError::Task(e))
            }
        };
        results.push(result);
    }
    results
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>T</title>
    <item><title>Test</title></item>
</channel></rss>"#;

    fn source(name: &str, url: impl Into<String>) -> Source {
        Source::new(name, url)
    }

    /// Canned responses keyed by URL, each delivered after a delay.
    struct StubFetcher {
        responses: HashMap<String, (Duration, Result<String, StatusCode>)>,
    }

    impl StubFetcher {
        fn new(entries: &[(&str, u64, Result<&str, StatusCode>)]) -> Self {
            let responses = entries
                .iter()
                .map(|(url, delay_ms, result)| {
                    let result = (*result).map(String::from);
                    (url.to_string(), (Duration::from_millis(*delay_ms), result))
                })
                .collect();
            Self { responses }
        }
    }

    impl Fetch for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            let (delay, result) = self.responses[url].clone();
            tokio::time::sleep(delay).await;
            result.map_err(FetchError::HttpStatus)
        }
    }

    /// Panics for any URL containing `boom`.
    struct PanickingFetcher;

    impl Fetch for PanickingFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            if url.contains("boom") {
                panic!("simulated fetch panic");
            }
            Ok(format!("body of {url}"))
        }
    }

    #[tokio::test]
    async fn results_follow_source_order_not_completion_order() {
        let fetcher = StubFetcher::new(&[
            ("stub://slow", 150, Ok("slow body")),
            ("stub://medium", 50, Ok("medium body")),
            ("stub://fast", 0, Ok("fast body")),
        ]);
        let sources = [
            source("Slow", "stub://slow"),
            source("Medium", "stub://medium"),
            source("Fast", "stub://fast"),
        ];

        let results = fetch_all(Arc::new(fetcher), &sources).await;

        let bodies: Vec<_> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(bodies, ["slow body", "medium body", "fast body"]);
    }

    #[tokio::test]
    async fn one_failing_source_is_isolated() {
        let fetcher = StubFetcher::new(&[
            ("stub://a", 20, Ok("a")),
            ("stub://b", 0, Err(StatusCode::INTERNAL_SERVER_ERROR)),
            ("stub://c", 10, Ok("c")),
        ]);
        let sources = [
            source("A", "stub://a"),
            source("B", "stub://b"),
            source("C", "stub://c"),
        ];

        let results = fetch_all(Arc::new(fetcher), &sources).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_deref().unwrap(), "a");
        assert_eq!(
            results[1].as_ref().unwrap_err().to_string(),
            "500 Internal Server Error"
        );
        assert_eq!(results[2].as_deref().unwrap(), "c");
    }

    #[tokio::test]
    async fn panicking_fetch_only_fails_its_own_slot() {
        let sources = [
            source("Ok", "stub://fine"),
            source("Boom", "stub://boom"),
        ];

        let results = fetch_all(Arc::new(PanickingFetcher), &sources).await;

        assert_eq!(results[0].as_deref().unwrap(), "body of stub://fine");
        assert!(matches!(results[1], Err(FetchError::Task(_))));
    }

    #[tokio::test]
    async fn no_sources_no_results() {
        let results = fetch_all(Arc::new(PanickingFetcher), &[]).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn http_fetcher_returns_body_on_200() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/rss+xml"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new(None).unwrap();
        let body = fetcher
            .fetch(&format!("{}/feed", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(body, VALID_RSS);
    }

    #[tokio::test]
    async fn http_fetcher_reports_status_line() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new(None).unwrap();
        let err = fetcher
            .fetch(&format!("{}/feed", mock_server.uri()))
            .await
            .unwrap_err();

        match &err {
            FetchError::HttpStatus(StatusCode::NOT_FOUND) => {}
            e => panic!("Expected HttpStatus(404), got {:?}", e),
        }
        assert_eq!(err.to_string(), "404 Not Found");
    }

    #[tokio::test]
    async fn http_fetcher_treats_other_2xx_as_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new(None).unwrap();
        let result = fetcher.fetch(&mock_server.uri()).await;

        assert!(matches!(result, Err(FetchError::HttpStatus(StatusCode::NO_CONTENT))));
    }

    #[tokio::test]
    async fn http_fetcher_wraps_truncated_body_with_url() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        // Promises 100 bytes, sends 5, then hangs up.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n<rss>")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let url = format!("http://{addr}/feed");
        let fetcher = HttpFetcher::new(Some(Duration::from_secs(5))).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        match &err {
            FetchError::BodyRead { url: failed, .. } => assert_eq!(failed, &url),
            e => panic!("Expected BodyRead, got {:?}", e),
        }
        assert!(err.to_string().starts_with(&format!("while reading {url}: ")));
    }

    #[tokio::test]
    async fn http_fetcher_surfaces_transport_errors() {
        // Nothing listens on port 1.
        let fetcher = HttpFetcher::new(Some(Duration::from_secs(5))).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:1/feed").await;

        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn http_fetcher_times_out_slow_servers() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new(Some(Duration::from_millis(100))).unwrap();
        let result = fetcher.fetch(&mock_server.uri()).await;

        match result {
            Err(FetchError::Transport(e)) => assert!(e.is_timeout()),
            other => panic!("Expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_all_over_http_isolates_failures() {
        let mock_server = MockServer::start().await;
        for (route, status) in [("/one", 200), ("/two", 503), ("/three", 200)] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(status).set_body_string(VALID_RSS))
                .mount(&mock_server)
                .await;
        }

        let sources = [
            source("One", format!("{}/one", mock_server.uri())),
            source("Two", format!("{}/two", mock_server.uri())),
            source("Three", format!("{}/three", mock_server.uri())),
        ];
        let fetcher = HttpFetcher::new(None).unwrap();

        let results = fetch_all(Arc::new(fetcher), &sources).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_deref().unwrap(), VALID_RSS);
        assert_eq!(
            results[1].as_ref().unwrap_err().to_string(),
            "503 Service Unavailable"
        );
        assert_eq!(results[2].as_deref().unwrap(), VALID_RSS);
    }
}
