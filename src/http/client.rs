//! HTTP transport.
//!
//! The repository clients never talk to `reqwest` directly. They hand a fully
//! assembled [`HttpRequest`] to a [`Transport`] and receive the raw
//! [`HttpResponse`] back: status, headers and a body that is either buffered or a
//! live byte stream, depending on the request's [`ResponseType`].
//!
//! [`ReqwestTransport`] is the default implementation. Tests and embedders can
//! provide their own transport, for example to record requests.
//!
//! # Examples
//!
//! ```ignore
//! use graphdb_http::http::{HttpClientConfig, HttpRequest, ReqwestTransport, Transport};
//! use http::Method;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = ReqwestTransport::with_config(&HttpClientConfig::default())?;
//!     let request = HttpRequest::new(Method::GET, "http://localhost:7200/repositories/repo1/size");
//!     let response = transport.send(request).await?;
//!     println!("{}", response.body.into_text().await?);
//!     Ok(())
//! }
//! ```

use crate::error::{GraphDbError, Result};
use crate::http::headers::{content_type_essence, find_header};
use crate::http::request_config::{HttpRequestConfig, ResponseType};
use crate::http::utils::timeout_duration;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

/// A live response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A request ready to be sent to one endpoint.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL, without query string
    pub url: String,
    /// Headers, parameters, timeout and response type
    pub config: HttpRequestConfig,
    /// Request body
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a request with an empty configuration.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        HttpRequest {
            method,
            url: url.into(),
            config: HttpRequestConfig::default(),
            body: None,
        }
    }
}

/// Response body, buffered or streamed.
pub enum ResponseBody {
    /// Whole body in memory
    Buffered(Bytes),
    /// Body delivered chunk by chunk
    Stream(ByteStream),
}

impl ResponseBody {
    /// Read the whole body.
    pub async fn into_bytes(self) -> Result<Bytes> {
        match self {
            ResponseBody::Buffered(bytes) => Ok(bytes),
            ResponseBody::Stream(mut stream) => {
                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buffer.extend_from_slice(&chunk?);
                }
                Ok(buffer.freeze())
            }
        }
    }

    /// Read the whole body as UTF-8 text.
    pub async fn into_text(self) -> Result<String> {
        let bytes = self.into_bytes().await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// View the body as a stream; a buffered body becomes a single chunk.
    pub fn into_stream(self) -> ByteStream {
        match self {
            ResponseBody::Buffered(bytes) => Box::pin(stream::iter(
                (!bytes.is_empty()).then_some(Ok(bytes)),
            )),
            ResponseBody::Stream(stream) => stream,
        }
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Buffered(bytes) => f.debug_tuple("Buffered").field(bytes).finish(),
            ResponseBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Raw response, returned unchanged by the endpoint pool.
#[derive(Debug)]
pub struct HttpResponse {
    /// URL the request was sent to
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers (names as sent by the server)
    pub headers: BTreeMap<String, String>,
    /// Response body
    pub body: ResponseBody,
}

impl HttpResponse {
    /// Buffered response, handy for tests and custom transports.
    pub fn buffered(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        HttpResponse {
            url: url.into(),
            status,
            headers: BTreeMap::new(),
            body: ResponseBody::Buffered(body.into()),
        }
    }

    /// Add a header to the response.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Header value, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Essence of the declared `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
            .map(content_type_essence)
            .filter(|mime| !mime.is_empty())
    }
}

/// Issues HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the response, whatever its status.
    ///
    /// Errors are reserved for requests that produced no response at all.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Settings of the underlying HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpClientConfig {
    /// Connection establishment timeout (ms), 0 for none
    pub connect_timeout_ms: u64,
    /// Idle connections are closed after this many seconds
    pub pool_idle_timeout_secs: u64,
    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// Proxy URL, empty for none
    pub proxy_url: String,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        HttpClientConfig {
            connect_timeout_ms: 0,
            pool_idle_timeout_secs: 90,
            pool_max_idle_per_host: 32,
            proxy_url: String::new(),
            user_agent: concat!("graphdb_http/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpClientConfig::default())
    }

    /// Create a transport with custom settings.
    pub fn with_config(config: &HttpClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.clone());

        if config.connect_timeout_ms > 0 {
            builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
        }

        if !config.proxy_url.is_empty() {
            let proxy = reqwest::Proxy::all(&config.proxy_url)
                .map_err(|e| GraphDbError::Config(format!("invalid proxy url: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| GraphDbError::Config(format!("cannot build http client: {}", e)))?;

        Ok(ReqwestTransport { client })
    }

    /// Wrap an already configured `reqwest` client.
    pub fn from_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> GraphDbError {
    GraphDbError::Transport {
        endpoint: url.to_string(),
        message: err.to_string(),
        timeout: err.is_timeout(),
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            config,
            body,
        } = request;

        let mut req_builder = self.client.request(method, &url);

        if let Some(headers) = &config.headers {
            for (name, value) in headers {
                req_builder = req_builder.header(name.as_str(), value.as_str());
            }
        }
        if let Some(params) = &config.params {
            let pairs: Vec<(&str, &str)> = params
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect();
            req_builder = req_builder.query(&pairs);
        }
        if let Some(timeout) = timeout_duration(config.timeout) {
            req_builder = req_builder.timeout(timeout);
        }
        if let Some(body) = body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status().as_u16();

        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }

        let body = if config.response_type == Some(ResponseType::Stream) {
            let stream_url = url.clone();
            ResponseBody::Stream(Box::pin(
                response
                    .bytes_stream()
                    .map(move |chunk| chunk.map_err(|e| transport_error(&stream_url, e))),
            ))
        } else {
            ResponseBody::Buffered(response.bytes().await.map_err(|e| transport_error(&url, e))?)
        };

        Ok(HttpResponse {
            url,
            status,
            headers,
            body,
        })
    }
}
