//! Utility functions for the HTTP layer.
//!
//! - Status code classification (success, failover-worthy)
//! - Timeout selection by HTTP method
//! - Query string and form body encoding

use http::Method;
use std::collections::BTreeMap;
use std::time::Duration;

/// Check if status code indicates success.
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Check if status code should move the request to the next endpoint.
///
/// Only server side failures qualify: another replica may answer a 5xx,
/// but it will answer a 4xx the same way.
pub fn is_failover_status(status: u16) -> bool {
    (500..600).contains(&status)
}

/// Whether a method reads data, and therefore runs under the read timeout.
pub fn is_read_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Pick the read or write timeout for a method; `0` means no timeout.
pub fn timeout_for_method(method: &Method, read_timeout_ms: u64, write_timeout_ms: u64) -> Option<u64> {
    let timeout = if is_read_method(method) {
        read_timeout_ms
    } else {
        write_timeout_ms
    };
    (timeout > 0).then_some(timeout)
}

/// Convert a millisecond timeout to a `Duration`.
pub fn timeout_duration(timeout_ms: Option<u64>) -> Option<Duration> {
    timeout_ms.map(Duration::from_millis)
}

/// Encode parameters as an `application/x-www-form-urlencoded` body.
pub fn encode_form<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in entries {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

/// Flatten a parameter map into borrowed pairs, as taken by the form encoder.
pub fn param_pairs(params: &BTreeMap<String, String>) -> impl Iterator<Item = (&str, &str)> {
    params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
}
