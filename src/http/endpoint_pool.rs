//! Ordered endpoints of one repository, with failover.
//!
//! An [`EndpointPool`] owns the endpoint list of a
//! [`RepositoryClientConfig`] and a shared cursor pointing at the endpoint that
//! last answered. Every call starts at the cursor and walks the list in order:
//!
//! 1. Build the request for the current endpoint: default headers merged with the
//!    request headers (request wins), timeout from the request or, when absent,
//!    the read timeout for `GET`/`HEAD` and the write timeout otherwise.
//! 2. A transport failure, or a 5xx when `failover_on_server_error` is set, moves
//!    on to the next endpoint.
//! 3. Any other non-2xx status fails the call at once.
//! 4. When every endpoint failed, the call fails with
//!    [`GraphDbError::EndpointsExhausted`], listing the endpoints tried.
//!
//! The cursor is an atomic index. Concurrent calls may race to advance it; a
//! failing call only advances it if nobody moved it in the meantime, and a
//! successful call pins it to the endpoint that answered, so interleaved calls
//! converge on a working endpoint.
//!
//! Responses are returned untouched: parsing is the repository client's job.

use crate::error::{GraphDbError, Result};
use crate::http::client::{HttpRequest, HttpResponse, Transport};
use crate::http::headers::{join_path, merge_headers};
use crate::http::request_config::HttpRequestConfig;
use crate::http::utils::{is_failover_status, is_success_status, timeout_for_method};
use crate::logging::{LogLevel, SharedLogger};
use crate::repository::RepositoryClientConfig;
use bytes::Bytes;
use http::Method;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Endpoints of one repository sharing a failover cursor.
pub struct EndpointPool {
    endpoints: Vec<String>,
    cursor: AtomicUsize,
    transport: Arc<dyn Transport>,
    default_headers: BTreeMap<String, String>,
    read_timeout: u64,
    write_timeout: u64,
    failover_on_server_error: bool,
    logger: SharedLogger,
}

impl EndpointPool {
    /// Create a pool over the endpoints of a validated configuration.
    pub fn new(config: &RepositoryClientConfig, transport: Arc<dyn Transport>) -> Self {
        EndpointPool {
            endpoints: config.endpoints().to_vec(),
            cursor: AtomicUsize::new(0),
            transport,
            default_headers: config.headers().clone(),
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
            failover_on_server_error: config.failover_on_server_error(),
            logger: config.logger(),
        }
    }

    /// All endpoints, in failover order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// The endpoint the next call starts with; empty for an empty pool.
    pub fn current_endpoint(&self) -> &str {
        let count = self.endpoints.len().max(1);
        self.endpoints
            .get(self.cursor.load(Ordering::Acquire) % count)
            .map_or("", String::as_str)
    }

    /// Send a request to the first endpoint that answers.
    ///
    /// `path` is relative to the endpoint URL: empty or starting with `/`.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        config: HttpRequestConfig,
        body: Option<Bytes>,
    ) -> Result<HttpResponse> {
        let count = self.endpoints.len();
        if count == 0 {
            return Err(GraphDbError::Config("endpoint pool is empty".to_string()));
        }

        let config = self.prepare(&method, config);
        let start = self.cursor.load(Ordering::Acquire) % count;
        let mut attempted = Vec::with_capacity(count);
        let mut last_error = None;

        for offset in 0..count {
            let index = (start + offset) % count;
            let endpoint = &self.endpoints[index];
            attempted.push(endpoint.clone());

            let request = HttpRequest {
                method: method.clone(),
                url: join_path(endpoint, path),
                config: config.clone(),
                body: body.clone(),
            };
            self.logger
                .log(LogLevel::Debug, &format!("{} {}", request.method, request.url));

            let failure = match self.transport.send(request).await {
                Ok(response) if is_success_status(response.status) => {
                    self.cursor.store(index, Ordering::Release);
                    if offset > 0 {
                        self.logger.log(
                            LogLevel::Info,
                            &format!("recovered on endpoint {} after {} failure(s)", endpoint, offset),
                        );
                    }
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status;
                    let body = match response.body.into_text().await {
                        Ok(body) => body,
                        Err(error) => format!("<unreadable body: {}>", error),
                    };
                    let error = GraphDbError::Status {
                        endpoint: response.url,
                        status,
                        body,
                    };
                    if !(self.failover_on_server_error && is_failover_status(status)) {
                        return Err(error);
                    }
                    error
                }
                Err(error) if error.is_transport_failure() => error,
                Err(error) => return Err(error),
            };

            self.logger.log(
                LogLevel::Warn,
                &format!("endpoint {} failed, trying next: {}", endpoint, failure),
            );
            let _ = self.cursor.compare_exchange(
                index,
                (index + 1) % count,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
            last_error = Some(failure);
        }

        let source = last_error.unwrap_or_else(|| GraphDbError::Config("no endpoint attempted".to_string()));
        self.logger.log(
            LogLevel::Error,
            &format!("all endpoints failed: {}", attempted.join(", ")),
        );
        Err(GraphDbError::EndpointsExhausted {
            attempted,
            source: Box::new(source),
        })
    }

    fn prepare(&self, method: &Method, mut config: HttpRequestConfig) -> HttpRequestConfig {
        let headers = merge_headers(&self.default_headers, config.headers.as_ref());
        config.headers = (!headers.is_empty()).then_some(headers);
        if config.timeout.is_none() {
            config.timeout = timeout_for_method(method, self.read_timeout, self.write_timeout);
        }
        config
    }
}

impl fmt::Debug for EndpointPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointPool")
            .field("endpoints", &self.endpoints)
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request_config::HttpRequestConfigBuilder;
    use crate::tests::support::{ok, refused, MockTransport};

    fn config(endpoints: &[&str]) -> RepositoryClientConfig {
        RepositoryClientConfig::builder()
            .endpoints(endpoints.iter().copied())
            .header("Authorization", "Basic abc")
            .read_timeout(1000)
            .write_timeout(2000)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_endpoint_answers() {
        let transport = MockTransport::new(|request| ok(request, "text/plain", "1"));
        let pool = EndpointPool::new(&config(&["http://a/repositories/r", "http://b/repositories/r"]), transport.clone());

        let response = pool
            .execute(Method::GET, "/size", HttpRequestConfig::default(), None)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://a/repositories/r/size");
    }

    #[tokio::test]
    async fn test_failover_attempts_at_most_m_plus_one() {
        let transport = MockTransport::new(|request| {
            if request.url.starts_with("http://down") {
                refused(request)
            } else {
                ok(request, "text/plain", "ok")
            }
        });
        let pool = EndpointPool::new(
            &config(&["http://down1/r", "http://down2/r", "http://up1/r", "http://up2/r"]),
            transport.clone(),
        );

        pool.execute(Method::GET, "", HttpRequestConfig::default(), None)
            .await
            .unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["http://down1/r", "http://down2/r", "http://up1/r"]);
        assert_eq!(pool.current_endpoint(), "http://up1/r");

        // the next call starts at the endpoint that answered
        pool.execute(Method::GET, "", HttpRequestConfig::default(), None)
            .await
            .unwrap();
        assert_eq!(transport.requests().last().unwrap().url, "http://up1/r");
    }

    #[tokio::test]
    async fn test_all_endpoints_failing() {
        let transport = MockTransport::new(refused);
        let pool = EndpointPool::new(&config(&["http://a/r", "http://b/r"]), transport.clone());

        let err = pool
            .execute(Method::GET, "/statements", HttpRequestConfig::default(), None)
            .await
            .unwrap_err();

        match err {
            GraphDbError::EndpointsExhausted { attempted, source } => {
                assert_eq!(attempted, vec!["http://a/r", "http://b/r"]);
                assert!(source.is_transport_failure());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_fails_over() {
        let transport = MockTransport::new(|request| {
            if request.url.starts_with("http://a") {
                Ok(HttpResponse::buffered(&request.url, 503, "unavailable"))
            } else {
                ok(request, "text/plain", "ok")
            }
        });
        let pool = EndpointPool::new(&config(&["http://a/r", "http://b/r"]), transport.clone());

        let response = pool
            .execute(Method::POST, "/statements", HttpRequestConfig::default(), None)
            .await
            .unwrap();
        assert_eq!(response.url, "http://b/r/statements");
    }

    #[tokio::test]
    async fn test_server_error_without_failover_policy() {
        let transport = MockTransport::new(|request| Ok(HttpResponse::buffered(&request.url, 500, "boom")));
        let config = RepositoryClientConfig::builder()
            .endpoints(["http://a/r", "http://b/r"])
            .failover_on_server_error(false)
            .build()
            .unwrap();
        let pool = EndpointPool::new(&config, transport.clone());

        let err = pool
            .execute(Method::GET, "", HttpRequestConfig::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_client_error_is_not_failed_over() {
        let transport = MockTransport::new(|request| Ok(HttpResponse::buffered(&request.url, 400, "MALFORMED QUERY")));
        let pool = EndpointPool::new(&config(&["http://a/r", "http://b/r"]), transport.clone());

        let err = pool
            .execute(Method::POST, "", HttpRequestConfig::default(), None)
            .await
            .unwrap_err();

        match err {
            GraphDbError::Status { status, body, .. } => {
                assert_eq!(status, 400);
                assert_eq!(body, "MALFORMED QUERY");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_headers_merged_and_timeouts_by_method() {
        let transport = MockTransport::new(|request| ok(request, "text/plain", ""));
        let pool = EndpointPool::new(&config(&["http://a/r"]), transport.clone());

        let read = HttpRequestConfigBuilder::new()
            .add_header("authorization", "Bearer token")
            .add_accept_header("text/turtle")
            .get();
        pool.execute(Method::GET, "", read, None).await.unwrap();
        pool.execute(Method::DELETE, "", HttpRequestConfig::default(), None)
            .await
            .unwrap();
        let overridden = HttpRequestConfigBuilder::new().set_timeout(5).get();
        pool.execute(Method::POST, "", overridden, None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].config,
            HttpRequestConfigBuilder::new()
                .add_header("authorization", "Bearer token")
                .add_accept_header("text/turtle")
                .set_timeout(1000)
                .get()
        );
        assert_eq!(requests[1].config.header("Authorization"), Some("Basic abc"));
        assert_eq!(requests[1].config.timeout, Some(2000));
        assert_eq!(requests[2].config.timeout, Some(5));
    }

    #[tokio::test]
    async fn test_concurrent_calls_converge() {
        let transport = MockTransport::new(|request| {
            if request.url.starts_with("http://down") {
                refused(request)
            } else {
                ok(request, "text/plain", "ok")
            }
        });
        let pool = Arc::new(EndpointPool::new(
            &config(&["http://down/r", "http://up/r"]),
            transport.clone(),
        ));

        let calls = (0..16).map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move {
                pool.execute(Method::GET, "", HttpRequestConfig::default(), None)
                    .await
                    .map(|response| response.url)
            })
        });
        for call in futures::future::join_all(calls).await {
            assert_eq!(call.unwrap().unwrap(), "http://up/r");
        }
        assert_eq!(pool.current_endpoint(), "http://up/r");
    }

    #[tokio::test]
    async fn test_unreadable_error_body_is_kept() {
        let transport = MockTransport::new(|request| {
            Ok(HttpResponse::buffered(&request.url, 400, Bytes::from_static(&[0xff, 0xfe])))
        });
        let pool = EndpointPool::new(&config(&["http://a/r"]), transport);

        let err = pool
            .execute(Method::GET, "", HttpRequestConfig::default(), None)
            .await
            .unwrap_err();
        match err {
            GraphDbError::Status { status, body, .. } => {
                assert_eq!(status, 400);
                assert!(body.starts_with("<unreadable body:"), "{body}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_pool_does_not_panic() {
        let transport = MockTransport::new(|request| ok(request, "text/plain", "1"));
        let pool = EndpointPool::new(&RepositoryClientConfig::default(), transport.clone());

        assert_eq!(pool.current_endpoint(), "");
        let err = pool
            .execute(Method::GET, "", HttpRequestConfig::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphDbError::Config(_)));
        assert!(transport.requests().is_empty());
    }
}
