//! Statement payloads.
//!
//! Terms may be given bare (`http://example.org/a`) or in N-Triples form
//! (`<http://example.org/a>`, `"42"^^<...>`, `_:b0`). Bare IRIs are wrapped in
//! angle brackets when the payload is serialized; encoded values pass through.

use crate::error::{GraphDbError, Result};
use crate::model::term_converter::{self, to_nt_term};
use oxrdf::{GraphName, Literal, Quad, Term};
use std::collections::BTreeMap;

/// Context value RDF4J reads as the default graph.
pub const NULL_CONTEXT: &str = "null";

/// Encode a graph for the `context` parameter.
pub(crate) fn context_param(context: &str) -> String {
    if context == NULL_CONTEXT {
        context.to_string()
    } else {
        to_nt_term(context)
    }
}

/// Statement pattern used by `get`, `download` and `delete_statements`.
///
/// Unset positions match anything.
///
/// # Examples
///
/// ```
/// use graphdb_http::repository::GetStatementsPayload;
/// use graphdb_http::http::mime;
///
/// let payload = GetStatementsPayload::new()
///     .with_subject("http://eunis.eea.europa.eu/countries/AZ")
///     .with_predicate("<http://eunis.eea.europa.eu/rdf/schema.rdf#population>")
///     .with_response_type(mime::N_TRIPLES);
///
/// let params = payload.params();
/// assert_eq!(params["subj"], "<http://eunis.eea.europa.eu/countries/AZ>");
/// assert_eq!(params["pred"], "<http://eunis.eea.europa.eu/rdf/schema.rdf#population>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetStatementsPayload {
    subject: Option<String>,
    predicate: Option<String>,
    object: Option<String>,
    context: Option<String>,
    inference: Option<bool>,
    response_type: Option<String>,
    streaming: bool,
}

impl GetStatementsPayload {
    /// A pattern matching every statement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Restrict the predicate.
    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Restrict the object.
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Restrict the graph; [`NULL_CONTEXT`] selects the default graph.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Include or exclude inferred statements.
    pub fn with_inference(mut self, inference: bool) -> Self {
        self.inference = Some(inference);
        self
    }

    /// Requested serialization; an empty value falls back to the client default.
    pub fn with_response_type(mut self, mime: impl Into<String>) -> Self {
        let mime = mime.into();
        self.response_type = (!mime.is_empty()).then_some(mime);
        self
    }

    /// Parse the response lazily.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Requested serialization, if any.
    pub fn response_type(&self) -> Option<&str> {
        self.response_type.as_deref()
    }

    /// Whether the response is parsed lazily.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Query parameters: `subj`, `pred`, `obj`, `context` and `infer`.
    pub fn params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        let terms = [
            ("subj", &self.subject),
            ("pred", &self.predicate),
            ("obj", &self.object),
        ];
        for (name, value) in terms {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.insert(name.to_string(), to_nt_term(value));
            }
        }
        if let Some(context) = self.context.as_deref().filter(|c| !c.is_empty()) {
            params.insert("context".to_string(), context_param(context));
        }
        if let Some(inference) = self.inference {
            params.insert("infer".to_string(), inference.to_string());
        }
        params
    }
}

/// A single statement to add, possibly into several graphs.
///
/// The object is an IRI unless a literal is requested with
/// [`with_literal`](AddStatementPayload::with_literal), a data type or a language.
///
/// # Examples
///
/// ```
/// use graphdb_http::repository::AddStatementPayload;
///
/// let payload = AddStatementPayload::new(
///     "http://eunis.eea.europa.eu/countries/AZ",
///     "http://eunis.eea.europa.eu/rdf/schema.rdf#population",
/// )
/// .with_literal("7931000")
/// .with_data_type("http://www.w3.org/2001/XMLSchema#integer")
/// .with_context("http://example.org/graph3");
///
/// let quads = payload.to_quads().unwrap();
/// assert_eq!(quads.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddStatementPayload {
    subject: String,
    predicate: String,
    object: String,
    literal: bool,
    data_type: Option<String>,
    language: Option<String>,
    contexts: Vec<String>,
    base_uri: Option<String>,
    commit: bool,
}

impl AddStatementPayload {
    /// A statement with the given subject and predicate.
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>) -> Self {
        AddStatementPayload {
            subject: subject.into(),
            predicate: predicate.into(),
            ..Self::default()
        }
    }

    /// IRI (or blank node) object.
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = object.into();
        self.literal = false;
        self
    }

    /// Literal object.
    pub fn with_literal(mut self, value: impl Into<String>) -> Self {
        self.object = value.into();
        self.literal = true;
        self
    }

    /// Data type of a literal object.
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into()).filter(|d| !d.is_empty());
        self.literal = true;
        self
    }

    /// Language of a literal object; wins over a data type.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into()).filter(|l| !l.is_empty());
        self.literal = true;
        self
    }

    /// Add a target graph; without any the default graph is used.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.contexts.push(context.into());
        self
    }

    /// Replace the target graphs.
    pub fn with_contexts<I>(mut self, contexts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.contexts = contexts.into_iter().map(Into::into).collect();
        self
    }

    /// Base IRI relative references resolve against on the server.
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into()).filter(|b| !b.is_empty());
        self
    }

    /// Commit right after the add (transactions only).
    pub fn with_commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    /// Base IRI, if any.
    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// Whether a transaction commits after the add.
    pub fn is_commit(&self) -> bool {
        self.commit
    }

    /// One quad per target graph.
    ///
    /// # Errors
    ///
    /// Fails on a missing or malformed subject, predicate or object.
    pub fn to_quads(&self) -> Result<Vec<Quad>> {
        if self.subject.is_empty() || self.predicate.is_empty() {
            return Err(GraphDbError::Config("statement needs a subject and a predicate".to_string()));
        }
        let subject = term_converter::to_subject(&self.subject)?;
        let predicate = term_converter::to_named_node(&self.predicate)?;
        let object = self.object_term()?;

        let graphs = if self.contexts.is_empty() {
            vec![GraphName::DefaultGraph]
        } else {
            self.contexts
                .iter()
                .map(|context| match context.as_str() {
                    NULL_CONTEXT => Ok(GraphName::DefaultGraph),
                    context => term_converter::to_graph_name(context),
                })
                .collect::<Result<Vec<_>>>()?
        };

        Ok(graphs
            .into_iter()
            .map(|graph| Quad::new(subject.clone(), predicate.clone(), object.clone(), graph))
            .collect())
    }

    fn object_term(&self) -> Result<Term> {
        if self.literal {
            return Ok(term_converter::to_literal(
                &self.object,
                self.data_type.as_deref(),
                self.language.as_deref(),
            )?
            .into());
        }
        if self.object.is_empty() {
            return Err(GraphDbError::Config("statement needs an object".to_string()));
        }
        if self.object.starts_with('"') {
            let literal: Literal = self
                .object
                .parse()
                .map_err(|e| GraphDbError::parse(format!("invalid literal {}: {}", self.object, e)))?;
            return Ok(literal.into());
        }
        Ok(term_converter::to_subject(&self.object)?.into())
    }
}
