//! SPARQL query and update payloads.
//!
//! A payload carries the query text plus the protocol options RDF4J accepts
//! alongside it. [`GetQueryPayload::encode`] and [`UpdateQueryPayload::encode`]
//! turn it into a request body and query parameters according to the request
//! content type:
//!
//! | Content type | Body | Parameters |
//! |--------------|------|------------|
//! | `application/x-www-form-urlencoded` (default) | every option, form encoded | none |
//! | `application/sparql-query` / `application/sparql-update` | the query text | every other option |
//!
//! # Examples
//!
//! ```
//! use graphdb_http::query::{GetQueryPayload, QueryType};
//!
//! let payload = GetQueryPayload::new("SELECT * WHERE { ?s ?p ?o }")
//!     .with_query_type(QueryType::Select)
//!     .with_limit(100)
//!     .with_inference(false);
//! let encoded = payload.encode().unwrap();
//! assert_eq!(encoded.content_type, "application/x-www-form-urlencoded");
//! assert!(encoded.body.contains("limit=100"));
//! ```

use crate::error::{GraphDbError, Result};
use crate::http::mime::{self, query_content_type};
use crate::http::utils::encode_form;
use crate::model::term_converter::to_nt_term;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// GraphDB dataset that turns a query into a request for its execution plan.
pub const EXPLAIN_GRAPH: &str = "http://www.ontotext.com/explain";

/// Query language of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryLanguage {
    /// SPARQL 1.1
    #[default]
    Sparql,
    /// SeRQL, still accepted by RDF4J
    Serql,
}

impl QueryLanguage {
    /// Value of the `queryLn` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryLanguage::Sparql => "sparql",
            QueryLanguage::Serql => "serql",
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form of a SPARQL query, which decides the default response type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryType {
    /// Tuple results
    #[default]
    Select,
    /// Boolean result
    Ask,
    /// RDF results
    Construct,
    /// RDF results
    Describe,
}

impl QueryType {
    /// Whether the query returns RDF rather than query results.
    pub fn is_graph_query(&self) -> bool {
        matches!(self, QueryType::Construct | QueryType::Describe)
    }

    /// `Accept` type used when neither the payload nor the client names one.
    pub fn default_response_type(&self) -> &'static str {
        if self.is_graph_query() {
            mime::TURTLE
        } else {
            mime::SPARQL_RESULTS_JSON
        }
    }
}

/// A payload ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedQuery {
    /// `Content-Type` of the body
    pub content_type: String,
    /// Request body
    pub body: String,
    /// Query string parameters
    pub params: BTreeMap<String, String>,
}

/// Options common to queries and updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct QueryOptions {
    query: String,
    language: QueryLanguage,
    content_type: Option<String>,
    inference: Option<bool>,
    timeout: Option<u64>,
    bindings: BTreeMap<String, String>,
}

impl QueryOptions {
    fn new(query: impl Into<String>) -> Self {
        QueryOptions {
            query: query.into(),
            ..QueryOptions::default()
        }
    }

    /// Encode `query` under `query_param`, with `extra` options appended after the common ones.
    fn encode(&self, query: &str, query_param: &str, raw_type: &str, extra: Vec<(&str, String)>) -> Result<EncodedQuery> {
        if query.trim().is_empty() {
            return Err(GraphDbError::Config("query is empty".to_string()));
        }
        let content_type = self
            .content_type
            .clone()
            .unwrap_or_else(|| query_content_type::X_WWW_FORM_URLENCODED.to_string());
        if content_type != query_content_type::X_WWW_FORM_URLENCODED && content_type != raw_type {
            return Err(GraphDbError::Config(format!(
                "unsupported query content type '{}'",
                content_type
            )));
        }

        let mut options: Vec<(String, String)> = vec![("queryLn".to_string(), self.language.as_str().to_string())];
        if let Some(inference) = self.inference {
            options.push(("infer".to_string(), inference.to_string()));
        }
        if let Some(timeout) = self.timeout.filter(|timeout| *timeout > 0) {
            options.push(("timeout".to_string(), timeout.to_string()));
        }
        options.extend(extra.into_iter().map(|(name, value)| (name.to_string(), value)));
        for (name, value) in &self.bindings {
            options.push((format!("${}", name), to_nt_term(value)));
        }

        if content_type == raw_type {
            return Ok(EncodedQuery {
                content_type,
                body: query.to_string(),
                params: options.into_iter().collect(),
            });
        }

        let body = encode_form(
            std::iter::once((query_param, query))
                .chain(options.iter().map(|(name, value)| (name.as_str(), value.as_str()))),
        );
        Ok(EncodedQuery {
            content_type,
            body,
            params: BTreeMap::new(),
        })
    }
}

macro_rules! common_options {
    () => {
        /// The query text.
        pub fn query(&self) -> &str {
            &self.options.query
        }

        /// Set the query language (SPARQL by default).
        pub fn with_language(mut self, language: QueryLanguage) -> Self {
            self.options.language = language;
            self
        }

        /// Set the request content type; an empty value restores the default.
        pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
            let content_type = content_type.into();
            self.options.content_type = (!content_type.is_empty()).then_some(content_type);
            self
        }

        /// Include or exclude inferred statements.
        pub fn with_inference(mut self, inference: bool) -> Self {
            self.options.inference = Some(inference);
            self
        }

        /// Server-side execution limit in seconds; 0 means none.
        pub fn with_timeout(mut self, seconds: u64) -> Self {
            self.options.timeout = Some(seconds);
            self
        }

        /// Bind a variable to a value.
        ///
        /// The value must be an IRI, bare or in angle brackets, or an already
        /// encoded term such as `"42"^^<http://www.w3.org/2001/XMLSchema#integer>`.
        /// Anything else is sent as an IRI, so a bare `42` becomes `<42>`.
        pub fn with_binding(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
            self.options.bindings.insert(variable.into(), value.into());
            self
        }
    };
}

/// A SPARQL query sent to the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetQueryPayload {
    options: QueryOptions,
    query_type: QueryType,
    response_type: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    distinct: Option<bool>,
    streaming: bool,
    explain: bool,
}

impl GetQueryPayload {
    /// A SELECT query.
    pub fn new(query: impl Into<String>) -> Self {
        GetQueryPayload {
            options: QueryOptions::new(query),
            ..GetQueryPayload::default()
        }
    }

    common_options!();

    /// Set the query form.
    pub fn with_query_type(mut self, query_type: QueryType) -> Self {
        self.query_type = query_type;
        self
    }

    /// Request a response type (`Accept`); an empty value restores the default.
    pub fn with_response_type(mut self, mime: impl Into<String>) -> Self {
        let mime = mime.into();
        self.response_type = (!mime.is_empty()).then_some(mime);
        self
    }

    /// Maximum number of results.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of results to skip.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Remove duplicate results.
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = Some(distinct);
        self
    }

    /// Parse the response lazily.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Ask for the query plan instead of the results.
    ///
    /// The query reads from [`EXPLAIN_GRAPH`], which GraphDB answers with the
    /// plan as a single-binding result.
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    /// The query form.
    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// The requested response type, if any.
    pub fn response_type(&self) -> Option<&str> {
        self.response_type.as_deref()
    }

    /// Whether the response is parsed lazily.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Whether the query plan is requested.
    pub fn is_explain(&self) -> bool {
        self.explain
    }

    /// Body and parameters of the request.
    pub fn encode(&self) -> Result<EncodedQuery> {
        let mut extra = Vec::new();
        if let Some(distinct) = self.distinct {
            extra.push(("distinct", distinct.to_string()));
        }
        if let Some(limit) = self.limit {
            extra.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            extra.push(("offset", offset.to_string()));
        }
        let query = if self.explain {
            Cow::Owned(with_explain_dataset(&self.options.query)?)
        } else {
            Cow::Borrowed(self.options.query.as_str())
        };
        self.options
            .encode(&query, "query", query_content_type::SPARQL_QUERY, extra)
    }
}

/// A SPARQL update sent to the statements resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateQueryPayload {
    options: QueryOptions,
}

impl UpdateQueryPayload {
    /// An update.
    pub fn new(update: impl Into<String>) -> Self {
        UpdateQueryPayload {
            options: QueryOptions::new(update),
        }
    }

    common_options!();

    /// Body and parameters of the request.
    pub fn encode(&self) -> Result<EncodedQuery> {
        self.options.encode(
            &self.options.query,
            "update",
            query_content_type::SPARQL_UPDATE,
            Vec::new(),
        )
    }
}

/// Insert `FROM <EXPLAIN_GRAPH>` before the `WHERE` keyword, or before the
/// group pattern when the keyword is omitted.
fn with_explain_dataset(query: &str) -> Result<String> {
    let brace = query
        .find('{')
        .ok_or_else(|| GraphDbError::Config("explained query has no group pattern".to_string()))?;
    let head = query[..brace].trim_end();
    let at = head
        .len()
        .checked_sub("where".len())
        .filter(|start| {
            head.get(*start..).is_some_and(|word| word.eq_ignore_ascii_case("where"))
                && !head[..*start].ends_with(|c: char| c.is_alphanumeric() || c == '_' || c == '?' || c == '$')
        })
        .unwrap_or(brace);
    Ok(format!("{}FROM <{}>\n{}", &query[..at], EXPLAIN_GRAPH, &query[at..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(body: &str) -> BTreeMap<String, String> {
        url::form_urlencoded::parse(body.as_bytes()).into_owned().collect()
    }

    #[test]
    fn test_form_encoded_query() {
        let encoded = GetQueryPayload::new("SELECT * WHERE { ?s ?p ?o }")
            .with_inference(true)
            .with_timeout(5)
            .with_distinct(true)
            .with_limit(10)
            .with_offset(20)
            .with_binding("s", "http://example.org/s")
            .encode()
            .unwrap();

        assert_eq!(encoded.content_type, query_content_type::X_WWW_FORM_URLENCODED);
        assert!(encoded.params.is_empty());
        let fields = form(&encoded.body);
        assert_eq!(fields["query"], "SELECT * WHERE { ?s ?p ?o }");
        assert_eq!(fields["queryLn"], "sparql");
        assert_eq!(fields["infer"], "true");
        assert_eq!(fields["timeout"], "5");
        assert_eq!(fields["distinct"], "true");
        assert_eq!(fields["limit"], "10");
        assert_eq!(fields["offset"], "20");
        assert_eq!(fields["$s"], "<http://example.org/s>");
    }

    #[test]
    fn test_raw_query_moves_options_to_params() {
        let encoded = GetQueryPayload::new("ASK { ?s ?p ?o }")
            .with_content_type(query_content_type::SPARQL_QUERY)
            .with_inference(false)
            .encode()
            .unwrap();

        assert_eq!(encoded.body, "ASK { ?s ?p ?o }");
        assert_eq!(encoded.params.get("infer").map(String::as_str), Some("false"));
        assert_eq!(encoded.params.get("queryLn").map(String::as_str), Some("sparql"));
        assert!(!encoded.params.contains_key("query"));
    }

    #[test]
    fn test_zero_timeout_is_omitted() {
        let encoded = GetQueryPayload::new("SELECT * {}").with_timeout(0).encode().unwrap();
        assert!(!form(&encoded.body).contains_key("timeout"));
    }

    #[test]
    fn test_update_uses_update_field() {
        let encoded = UpdateQueryPayload::new("INSERT DATA { <urn:a> <urn:b> <urn:c> }")
            .encode()
            .unwrap();
        assert_eq!(form(&encoded.body)["update"], "INSERT DATA { <urn:a> <urn:b> <urn:c> }");

        let raw = UpdateQueryPayload::new("CLEAR ALL")
            .with_content_type(query_content_type::SPARQL_UPDATE)
            .encode()
            .unwrap();
        assert_eq!(raw.body, "CLEAR ALL");
        assert_eq!(raw.content_type, query_content_type::SPARQL_UPDATE);
    }

    #[test]
    fn test_mismatched_content_type_rejected() {
        let err = UpdateQueryPayload::new("CLEAR ALL")
            .with_content_type(query_content_type::SPARQL_QUERY)
            .encode()
            .unwrap_err();
        assert!(matches!(err, GraphDbError::Config(_)));
    }

    #[test]
    fn test_explain_reads_from_explain_graph() {
        let encoded = GetQueryPayload::new("SELECT ?s WHERE { ?s ?p ?o }")
            .with_explain(true)
            .encode()
            .unwrap();
        assert_eq!(
            form(&encoded.body)["query"],
            "SELECT ?s FROM <http://www.ontotext.com/explain>\nWHERE { ?s ?p ?o }"
        );

        let raw = GetQueryPayload::new("select * {?s ?p ?o}")
            .with_explain(true)
            .with_content_type(query_content_type::SPARQL_QUERY)
            .encode()
            .unwrap();
        assert_eq!(raw.body, "select * FROM <http://www.ontotext.com/explain>\n{?s ?p ?o}");

        let plain = GetQueryPayload::new("SELECT ?s WHERE { ?s ?p ?o }").encode().unwrap();
        assert!(!plain.body.contains("explain"));
        assert!(GetQueryPayload::new("DESCRIBE <urn:a>").with_explain(true).encode().is_err());
    }

    #[test]
    fn test_binding_values_sent_as_terms() {
        let encoded = GetQueryPayload::new("SELECT * WHERE { ?s ?p ?o }")
            .with_binding("o", "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>")
            .with_binding("p", "<http://example.org/p>")
            .with_binding("n", "42")
            .encode()
            .unwrap();
        let fields = form(&encoded.body);
        assert_eq!(fields["$o"], "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>");
        assert_eq!(fields["$p"], "<http://example.org/p>");
        assert_eq!(fields["$n"], "<42>");
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(GetQueryPayload::new("  ").encode().is_err());
    }

    #[test]
    fn test_default_response_types() {
        assert_eq!(QueryType::Select.default_response_type(), mime::SPARQL_RESULTS_JSON);
        assert_eq!(QueryType::Ask.default_response_type(), mime::SPARQL_RESULTS_JSON);
        assert_eq!(QueryType::Construct.default_response_type(), mime::TURTLE);
        assert!(QueryType::Describe.is_graph_query());
    }
}
