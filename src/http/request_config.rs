//! Transport-agnostic request configuration.
//!
//! [`HttpRequestConfigBuilder`] accumulates headers, query parameters, a timeout
//! and a response type through discrete setter calls. Values that are absent
//! (`None`, an empty string, an empty name, or a zero timeout) are skipped, so the
//! assembled [`HttpRequestConfig`] never carries a key that was set with an empty
//! value. "Unset" and "empty" therefore compare equal.
//!
//! # Examples
//!
//! ```
//! use graphdb_http::http::{HttpRequestConfigBuilder, ResponseType};
//!
//! let config = HttpRequestConfigBuilder::new()
//!     .add_accept_header("text/turtle")
//!     .add_param("subj", "<http://example.org/a>")
//!     .add_param("pred", None)
//!     .add_content_type_header("")
//!     .set_timeout(1000)
//!     .set_response_type(ResponseType::Stream)
//!     .get();
//!
//! assert_eq!(config.headers.unwrap().len(), 1);
//! assert_eq!(config.params.unwrap().len(), 1);
//! assert_eq!(config.timeout, Some(1000));
//! ```

use std::collections::BTreeMap;

/// Header name for content negotiation of the response.
pub const ACCEPT: &str = "Accept";
/// Header name for the request body serialization.
pub const CONTENT_TYPE: &str = "Content-Type";

/// How the transport should deliver the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Hand the body over as a live byte stream
    Stream,
    /// Read the whole body before returning
    Buffered,
}

/// Assembled per-request configuration.
///
/// Every field is optional and stays `None` unless a non-empty value was set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequestConfig {
    /// Request headers, unique names, last write wins
    pub headers: Option<BTreeMap<String, String>>,
    /// Query parameters, unique names, last write wins
    pub params: Option<BTreeMap<String, String>>,
    /// Timeout override in milliseconds
    pub timeout: Option<u64>,
    /// Requested delivery of the response body
    pub response_type: Option<ResponseType>,
}

impl HttpRequestConfig {
    /// Value of a header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    /// Value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.as_ref().and_then(|params| params.get(name)).map(String::as_str)
    }

    /// Whether the body should be streamed.
    pub fn is_stream(&self) -> bool {
        self.response_type == Some(ResponseType::Stream)
    }
}

/// The single absence rule applied by every setter.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Collect the present entries of a map, `None` when nothing is left.
fn present_map<'a, I>(entries: I) -> Option<BTreeMap<String, String>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let map: BTreeMap<String, String> = entries
        .into_iter()
        .filter_map(|(key, value)| Some((present(Some(key))?.to_string(), present(Some(value))?.to_string())))
        .collect();
    (!map.is_empty()).then_some(map)
}

/// Fluent builder for [`HttpRequestConfig`].
#[derive(Debug, Clone, Default)]
pub struct HttpRequestConfigBuilder {
    config: HttpRequestConfig,
}

impl HttpRequestConfigBuilder {
    /// Start from an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header; skipped when the name or value is absent.
    pub fn add_header<'a>(mut self, name: &str, value: impl Into<Option<&'a str>>) -> Self {
        if let (Some(name), Some(value)) = (present(Some(name)), present(value.into())) {
            self.config
                .headers
                .get_or_insert_with(BTreeMap::new)
                .insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Replace all headers with the present entries of `headers`.
    pub fn set_headers<'a, I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.config.headers = present_map(headers);
        self
    }

    /// Add a query parameter; skipped when the name or value is absent.
    pub fn add_param<'a>(mut self, name: &str, value: impl Into<Option<&'a str>>) -> Self {
        if let (Some(name), Some(value)) = (present(Some(name)), present(value.into())) {
            self.config
                .params
                .get_or_insert_with(BTreeMap::new)
                .insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Replace all query parameters with the present entries of `params`.
    pub fn set_params<'a, I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.config.params = present_map(params);
        self
    }

    /// Set the timeout in milliseconds; `None` and `0` are absent.
    pub fn set_timeout(mut self, timeout: impl Into<Option<u64>>) -> Self {
        if let Some(timeout) = timeout.into().filter(|timeout| *timeout > 0) {
            self.config.timeout = Some(timeout);
        }
        self
    }

    /// Set how the response body is delivered.
    pub fn set_response_type(mut self, response_type: impl Into<Option<ResponseType>>) -> Self {
        if let Some(response_type) = response_type.into() {
            self.config.response_type = Some(response_type);
        }
        self
    }

    /// Shortcut for the `Accept` header.
    pub fn add_accept_header<'a>(self, mime: impl Into<Option<&'a str>>) -> Self {
        self.add_header(ACCEPT, mime)
    }

    /// Shortcut for the `Content-Type` header.
    pub fn add_content_type_header<'a>(self, mime: impl Into<Option<&'a str>>) -> Self {
        self.add_header(CONTENT_TYPE, mime)
    }

    /// The assembled configuration.
    pub fn get(self) -> HttpRequestConfig {
        self.config
    }

    /// Headers set so far.
    pub fn get_headers(&self) -> Option<&BTreeMap<String, String>> {
        self.config.headers.as_ref()
    }

    /// Query parameters set so far.
    pub fn get_params(&self) -> Option<&BTreeMap<String, String>> {
        self.config.params.as_ref()
    }

    /// Timeout set so far.
    pub fn get_timeout(&self) -> Option<u64> {
        self.config.timeout
    }

    /// Response type set so far.
    pub fn get_response_type(&self) -> Option<ResponseType> {
        self.config.response_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_init_with_empty_config() {
        assert_eq!(HttpRequestConfigBuilder::new().get(), HttpRequestConfig::default());
    }

    #[test]
    fn test_add_header() {
        let config = HttpRequestConfigBuilder::new().add_header("Accept", "text/turtle").get();
        assert_eq!(config.headers, Some(map(&[("Accept", "text/turtle")])));
        assert_eq!(config.params, None);
    }

    #[test]
    fn test_set_params() {
        let config = HttpRequestConfigBuilder::new()
            .set_params([("subj", "subj"), ("pred", "pred")])
            .get();
        assert_eq!(config.params, Some(map(&[("subj", "subj"), ("pred", "pred")])));
    }

    #[test]
    fn test_add_param() {
        let builder = HttpRequestConfigBuilder::new()
            .add_param("subj", "subj")
            .add_param("pred", "pred");
        assert_eq!(builder.get_params(), Some(&map(&[("subj", "subj"), ("pred", "pred")])));
    }

    #[test]
    fn test_last_write_wins() {
        let config = HttpRequestConfigBuilder::new()
            .add_param("subj", "first")
            .add_param("subj", "second")
            .get();
        assert_eq!(config.param("subj"), Some("second"));
    }

    #[test]
    fn test_set_timeout() {
        let builder = HttpRequestConfigBuilder::new().set_timeout(1000);
        assert_eq!(builder.get_timeout(), Some(1000));
        assert_eq!(
            builder.get(),
            HttpRequestConfig {
                timeout: Some(1000),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_set_response_type() {
        let config = HttpRequestConfigBuilder::new()
            .set_response_type(ResponseType::Stream)
            .get();
        assert!(config.is_stream());
        assert_eq!(config.headers, None);
    }

    #[test]
    fn test_accept_and_content_type_headers() {
        let builder = HttpRequestConfigBuilder::new()
            .add_accept_header("text/turtle")
            .add_content_type_header("application/n-quads");
        assert_eq!(
            builder.get_headers(),
            Some(&map(&[("Accept", "text/turtle"), ("Content-Type", "application/n-quads")]))
        );
    }

    #[test]
    fn test_skip_empty_values() {
        let config = HttpRequestConfigBuilder::new()
            .add_content_type_header("")
            .add_accept_header(None)
            .add_header("custom", None)
            .add_header("", "value")
            .add_param("infer", "")
            .set_timeout(0)
            .set_timeout(None)
            .set_response_type(None)
            .get();
        assert_eq!(config, HttpRequestConfig::default());
    }

    #[test]
    fn test_set_maps_drop_empty_entries() {
        let config = HttpRequestConfigBuilder::new()
            .set_headers([("Accept", ""), ("", "x")])
            .set_params([("subj", "<a>"), ("pred", "")])
            .get();
        assert_eq!(config.headers, None);
        assert_eq!(config.params, Some(map(&[("subj", "<a>")])));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let config = HttpRequestConfigBuilder::new().add_accept_header("text/n3").get();
        assert_eq!(config.header("accept"), Some("text/n3"));
        assert_eq!(config.header("content-type"), None);
    }
}
