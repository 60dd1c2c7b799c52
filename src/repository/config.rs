//! Repository client configuration.
//!
//! A [`RepositoryClientConfig`] is immutable once built. It is assembled either
//! with [`RepositoryClientConfig::builder`] or deserialized from JSON with
//! [`RepositoryClientConfig::from_json`]. Both paths validate before returning,
//! so a bad endpoint list or a non-numeric timeout fails before any request is
//! made.
//!
//! # Examples
//!
//! ```
//! use graphdb_http::repository::RepositoryClientConfig;
//! use graphdb_http::http::mime;
//!
//! let config = RepositoryClientConfig::builder()
//!     .endpoint("http://localhost:7200/repositories/repo1")
//!     .endpoint("http://replica:7200/repositories/repo1")
//!     .default_rdf_mime_type(mime::TURTLE)
//!     .read_timeout(30_000)
//!     .write_timeout(60_000)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.endpoints().len(), 2);
//!
//! let from_file = RepositoryClientConfig::from_json(
//!     r#"{"endpoints": ["http://localhost:7200/repositories/repo1"], "readTimeout": 1000}"#,
//! ).unwrap();
//! assert_eq!(from_file.read_timeout(), 1000);
//! ```

use crate::error::{GraphDbError, Result};
use crate::http::HttpClientConfig;
use crate::logging::{noop_logger, SharedLogger};
use serde::Deserialize;
use std::collections::BTreeMap;
use url::Url;

/// Settings shared by every request of a repository client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepositoryClientConfig {
    endpoints: Vec<String>,
    headers: BTreeMap<String, String>,
    #[serde(rename = "defaultRDFMimeType")]
    default_rdf_mime_type: Option<String>,
    read_timeout: u64,
    write_timeout: u64,
    failover_on_server_error: bool,
    http: HttpClientConfig,
    #[serde(skip, default = "noop_logger")]
    logger: SharedLogger,
}

impl Default for RepositoryClientConfig {
    fn default() -> Self {
        RepositoryClientConfig {
            endpoints: Vec::new(),
            headers: BTreeMap::new(),
            default_rdf_mime_type: None,
            read_timeout: 0,
            write_timeout: 0,
            failover_on_server_error: true,
            http: HttpClientConfig::default(),
            logger: noop_logger(),
        }
    }
}

impl RepositoryClientConfig {
    /// Start building a configuration.
    pub fn builder() -> RepositoryClientConfigBuilder {
        RepositoryClientConfigBuilder::default()
    }

    /// Deserialize and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RepositoryClientConfig = serde_json::from_str(json)
            .map_err(|e| GraphDbError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants: at least one endpoint, every endpoint an absolute
    /// http(s) URL, no empty default MIME type.
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(GraphDbError::Config("at least one endpoint is required".to_string()));
        }
        for endpoint in &self.endpoints {
            let url = Url::parse(endpoint)
                .map_err(|e| GraphDbError::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(GraphDbError::Config(format!(
                    "endpoint '{}' must use http or https",
                    endpoint
                )));
            }
        }
        if matches!(self.default_rdf_mime_type.as_deref(), Some("")) {
            return Err(GraphDbError::Config("default RDF MIME type is empty".to_string()));
        }
        Ok(())
    }

    /// Endpoint URLs, in failover order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// MIME type used when a payload does not name one.
    pub fn default_rdf_mime_type(&self) -> Option<&str> {
        self.default_rdf_mime_type.as_deref()
    }

    /// Timeout of read operations in milliseconds, 0 for none.
    pub fn read_timeout(&self) -> u64 {
        self.read_timeout
    }

    /// Timeout of write operations in milliseconds, 0 for none.
    pub fn write_timeout(&self) -> u64 {
        self.write_timeout
    }

    /// Whether 5xx responses move the request to the next endpoint.
    pub fn failover_on_server_error(&self) -> bool {
        self.failover_on_server_error
    }

    /// Settings of the default HTTP transport.
    pub fn http(&self) -> &HttpClientConfig {
        &self.http
    }

    /// Logger handed to every component.
    pub fn logger(&self) -> SharedLogger {
        self.logger.clone()
    }

    /// Replace the logger, e.g. after deserialization.
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Same settings against a single other endpoint.
    pub(crate) fn for_endpoint(&self, endpoint: impl Into<String>) -> Result<Self> {
        self.for_endpoints(vec![endpoint.into()])
    }

    /// Same settings against another endpoint list.
    pub(crate) fn for_endpoints(&self, endpoints: Vec<String>) -> Result<Self> {
        let config = RepositoryClientConfig {
            endpoints,
            ..self.clone()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Builder for [`RepositoryClientConfig`].
#[derive(Debug, Default)]
pub struct RepositoryClientConfigBuilder {
    config: RepositoryClientConfig,
}

impl RepositoryClientConfigBuilder {
    /// Append one endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoints.push(endpoint.into());
        self
    }

    /// Replace the endpoint list.
    pub fn endpoints<I>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.config.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    /// Add a default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    /// Replace the default headers.
    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.config.headers = headers;
        self
    }

    /// Default `Accept` type of statement reads; an empty value means none.
    pub fn default_rdf_mime_type(mut self, mime: impl Into<String>) -> Self {
        let mime = mime.into();
        self.config.default_rdf_mime_type = (!mime.is_empty()).then_some(mime);
        self
    }

    /// Read timeout in milliseconds.
    pub fn read_timeout(mut self, timeout_ms: u64) -> Self {
        self.config.read_timeout = timeout_ms;
        self
    }

    /// Write timeout in milliseconds.
    pub fn write_timeout(mut self, timeout_ms: u64) -> Self {
        self.config.write_timeout = timeout_ms;
        self
    }

    /// Fail over on 5xx responses (default `true`).
    pub fn failover_on_server_error(mut self, enabled: bool) -> Self {
        self.config.failover_on_server_error = enabled;
        self
    }

    /// Settings of the default HTTP transport.
    pub fn http(mut self, http: HttpClientConfig) -> Self {
        self.config.http = http;
        self
    }

    /// Logger handed to every component.
    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.config.logger = logger;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<RepositoryClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
