//! Values returned by repository operations.
//!
//! | Type | Returned by |
//! |------|-------------|
//! | [`RdfItem`] | parsers: a quad, a SPARQL solution or an ASK answer |
//! | [`RepositoryResponse`] | `get` and `query` |
//! | [`DownloadStream`] | `download` |
//! | [`Namespace`] | namespace listing |

use crate::error::{GraphDbError, Result};
use crate::http::ByteStream;
use crate::parser::RdfItemStream;
use oxrdf::{Quad, Term};
use std::collections::BTreeMap;
use std::fmt;

/// One SPARQL solution: variable name to bound term.
pub type Bindings = BTreeMap<String, Term>;

/// Unit of parsed response content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdfItem {
    /// A statement from an RDF serialization
    Quad(Quad),
    /// A row of SPARQL SELECT results
    Solution(Bindings),
    /// The answer of a SPARQL ASK query
    Boolean(bool),
}

impl RdfItem {
    /// The quad, if this item is one.
    pub fn as_quad(&self) -> Option<&Quad> {
        match self {
            RdfItem::Quad(quad) => Some(quad),
            _ => None,
        }
    }

    /// Consume the item into a quad, if it is one.
    pub fn into_quad(self) -> Option<Quad> {
        match self {
            RdfItem::Quad(quad) => Some(quad),
            _ => None,
        }
    }

    /// The solution bindings, if this item is a solution.
    pub fn as_solution(&self) -> Option<&Bindings> {
        match self {
            RdfItem::Solution(bindings) => Some(bindings),
            _ => None,
        }
    }
}

impl From<Quad> for RdfItem {
    fn from(quad: Quad) -> Self {
        RdfItem::Quad(quad)
    }
}

/// Result of `get` and `query`.
///
/// Which variant comes back depends on whether a parser is registered for the
/// response content type and whether streaming was requested:
///
/// | Parser | Streaming | Variant |
/// |--------|-----------|---------|
/// | yes | no | [`Items`](RepositoryResponse::Items) |
/// | yes | yes | [`Stream`](RepositoryResponse::Stream) |
/// | no | no | [`Text`](RepositoryResponse::Text) |
/// | no | yes | [`Bytes`](RepositoryResponse::Bytes) |
///
/// Parsers that always stream, such as JSON-LD, return
/// [`Stream`](RepositoryResponse::Stream) even when streaming was not requested.
pub enum RepositoryResponse {
    /// Fully parsed content, in document order
    Items(Vec<RdfItem>),
    /// Lazily parsed content
    Stream(RdfItemStream),
    /// Raw body
    Text(String),
    /// Raw body chunks
    Bytes(ByteStream),
}

impl RepositoryResponse {
    /// Collect every item, draining a stream if needed.
    ///
    /// # Errors
    ///
    /// Fails on raw responses and on items that failed to parse.
    pub async fn into_items(self) -> Result<Vec<RdfItem>> {
        match self {
            RepositoryResponse::Items(items) => Ok(items),
            RepositoryResponse::Stream(stream) => stream.collect_items().await,
            RepositoryResponse::Text(_) | RepositoryResponse::Bytes(_) => Err(GraphDbError::parse(
                "response was not parsed: no parser registered for its content type",
            )),
        }
    }

    /// Collect every quad, ignoring other item kinds.
    pub async fn into_quads(self) -> Result<Vec<Quad>> {
        Ok(self
            .into_items()
            .await?
            .into_iter()
            .filter_map(RdfItem::into_quad)
            .collect())
    }

    /// The raw text, if the response was not parsed.
    pub fn into_text(self) -> Option<String> {
        match self {
            RepositoryResponse::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Debug for RepositoryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryResponse::Items(items) => f.debug_tuple("Items").field(items).finish(),
            RepositoryResponse::Stream(_) => f.write_str("Stream(..)"),
            RepositoryResponse::Text(text) => f.debug_tuple("Text").field(text).finish(),
            RepositoryResponse::Bytes(_) => f.write_str("Bytes(..)"),
        }
    }
}

/// Result of `download`: never buffered.
pub enum DownloadStream {
    /// Parsed items, when a parser is registered for the content type
    Items(RdfItemStream),
    /// Raw chunks otherwise
    Bytes(ByteStream),
}

impl fmt::Debug for DownloadStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadStream::Items(_) => f.write_str("Items(..)"),
            DownloadStream::Bytes(_) => f.write_str("Bytes(..)"),
        }
    }
}

/// A namespace declaration of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix, without the colon
    pub prefix: String,
    /// Namespace IRI
    pub namespace: String,
}

impl Namespace {
    /// Create a namespace declaration.
    pub fn new(prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        Namespace {
            prefix: prefix.into(),
            namespace: namespace.into(),
        }
    }
}
