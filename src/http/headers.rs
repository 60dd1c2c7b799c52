//! Header parsing and merging shared by the transport and the repository clients.
//!
//! # Header Handling
//!
//! | Header | Direction | Handling |
//! |--------|-----------|----------|
//! | Accept | request | selects the response serialization |
//! | Content-Type | request | selects the request body serialization |
//! | Content-Type | response | essence selects the response parser |
//! | Location | response | transaction URL, resolved against the request URL |
//!
//! # Examples
//!
//! ```
//! use graphdb_http::http::headers::{content_type_essence, resolve_location};
//!
//! assert_eq!(content_type_essence("text/turtle; charset=UTF-8"), "text/turtle");
//!
//! let url = resolve_location(
//!     "http://host/repositories/repo1/transactions",
//!     "/repositories/repo1/transactions/64a5",
//! ).unwrap();
//! assert_eq!(url, "http://host/repositories/repo1/transactions/64a5");
//! ```

use crate::error::{GraphDbError, Result};
use std::collections::BTreeMap;
use url::Url;

/// Strip parameters (`; charset=...`) and surrounding whitespace from a media type.
///
/// Case is preserved: registered MIME types are matched exactly.
pub fn content_type_essence(value: &str) -> &str {
    value.split(';').next().unwrap_or_default().trim()
}

/// Merge request headers over default headers.
///
/// Names collide case-insensitively; on collision the request header wins and
/// its spelling is kept.
pub fn merge_headers(
    defaults: &BTreeMap<String, String>,
    overrides: Option<&BTreeMap<String, String>>,
) -> BTreeMap<String, String> {
    let mut merged = defaults.clone();
    if let Some(overrides) = overrides {
        for (name, value) in overrides {
            merged.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

/// Look up a response header by name, case-insensitively.
pub fn find_header<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Resolve a `Location` header value against the URL of the request that produced it.
///
/// # Errors
///
/// Returns an error if either the request URL or the resolved location is not a valid URL.
pub fn resolve_location(request_url: &str, location: &str) -> Result<String> {
    let location = location.trim();
    if location.is_empty() {
        return Err(GraphDbError::MissingHeader("Location".to_string()));
    }
    let base = Url::parse(request_url)?;
    Ok(base.join(location)?.to_string())
}

/// Join an endpoint base URL and a repository-relative path.
///
/// `path` is either empty or starts with `/`.
pub fn join_path(endpoint: &str, path: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), path)
}
