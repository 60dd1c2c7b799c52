//! Repository client.
//!
//! [`RdfRepositoryClient`] maps repository operations onto the RDF4J REST
//! protocol:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `get`, `download` | `GET /statements?subj&pred&obj&context&infer` |
//! | `add`, `add_quads`, `add_data`, `update` | `POST /statements` |
//! | `put_quads`, `put_data` | `PUT /statements` |
//! | `delete_statements`, `delete_all_statements` | `DELETE /statements` |
//! | `query` | `POST /` |
//! | `get_size` | `GET /size` |
//! | `get_namespaces`, `delete_all_namespaces` | `GET`, `DELETE /namespaces` |
//! | `get_namespace`, `save_namespace`, `delete_namespace` | `GET`, `PUT`, `DELETE /namespaces/{prefix}` |
//! | `begin_transaction` | `POST /transactions` |
//!
//! Paths are relative to each endpoint of the configuration, e.g.
//! `http://localhost:7200/repositories/repo1`. Reads use the read timeout,
//! writes the write timeout. Transport errors come back exactly as the
//! endpoint pool reported them.
//!
//! # Response parsing
//!
//! The registry starts empty, so by default responses are returned raw. Once a
//! parser is registered for the response type, reads come back as items:
//!
//! ```ignore
//! use graphdb_http::repository::{GetStatementsPayload, RdfRepositoryClient, RepositoryClientConfig};
//! use graphdb_http::parser::ContentParser;
//! use graphdb_http::http::mime;
//!
//! let config = RepositoryClientConfig::builder()
//!     .endpoint("http://localhost:7200/repositories/repo1")
//!     .build()?;
//! let repository = RdfRepositoryClient::new(config)?;
//! repository.register_parser(ContentParser::NTriples);
//!
//! let quads = repository
//!     .get(&GetStatementsPayload::new()
//!         .with_subject("http://eunis.eea.europa.eu/countries/AZ")
//!         .with_response_type(mime::N_TRIPLES))
//!     .await?
//!     .into_quads()
//!     .await?;
//! ```

use super::base::BaseRepositoryClient;
use super::payload::{AddStatementPayload, GetStatementsPayload};
use super::RepositoryClientConfig;
use crate::error::{GraphDbError, Result};
use crate::http::headers::{find_header, resolve_location};
use crate::http::mime::{self, query_content_type};
use crate::http::utils::param_pairs;
use crate::http::{EndpointPool, HttpRequestConfig, HttpRequestConfigBuilder, ResponseType, Transport};
use crate::logging::LogLevel;
use crate::model::term_converter::to_nquads;
use crate::parser::{ContentParser, ParserConfig};
use crate::query::{EncodedQuery, GetQueryPayload, UpdateQueryPayload};
use crate::transaction::{TransactionIsolationLevel, TransactionalRepositoryClient};
use crate::types::{DownloadStream, Namespace, RdfItem, RepositoryResponse};
use bytes::Bytes;
use http::Method;
use oxrdf::{Quad, Term};
use std::sync::Arc;

const STATEMENTS: &str = "/statements";
const SIZE: &str = "/size";
const NAMESPACES: &str = "/namespaces";
const TRANSACTIONS: &str = "/transactions";

/// Client of one RDF repository, possibly served by several endpoints.
///
/// Cheap to clone; clones share the endpoint pool and the parser registry.
#[derive(Debug, Clone)]
pub struct RdfRepositoryClient {
    base: BaseRepositoryClient,
}

impl RdfRepositoryClient {
    /// Create a client sending through `reqwest`.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built from the configuration.
    pub fn new(config: RepositoryClientConfig) -> Result<Self> {
        Ok(RdfRepositoryClient {
            base: BaseRepositoryClient::new(config)?,
        })
    }

    /// Create a client sending through a custom transport.
    pub fn with_transport(config: RepositoryClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(RdfRepositoryClient {
            base: BaseRepositoryClient::with_transport(config, transport)?,
        })
    }

    pub(crate) fn from_base(base: BaseRepositoryClient) -> Self {
        RdfRepositoryClient { base }
    }

    /// The configuration the client was built with.
    pub fn config(&self) -> &RepositoryClientConfig {
        self.base.config()
    }

    /// The endpoint pool requests go through.
    pub fn endpoint_pool(&self) -> &EndpointPool {
        self.base.pool()
    }

    /// Register a parser for its MIME type, returning the one it replaces.
    pub fn register_parser(&self, parser: ContentParser) -> Option<ContentParser> {
        self.base.register_parser(parser)
    }

    /// Register every built-in parser.
    pub fn register_default_parsers(&self) {
        self.base.register_default_parsers()
    }

    /// Read statements matching a pattern.
    ///
    /// The response is parsed when a parser is registered for its content type
    /// (or, failing that, for the requested type), and streamed when the payload
    /// asks for it or the parser streams by default.
    pub async fn get(&self, payload: &GetStatementsPayload) -> Result<RepositoryResponse> {
        let requested = self.base.accept_type(payload.response_type());
        let streaming = self.base.wants_stream(requested, payload.is_streaming());
        let config = self.base.statements_request(payload, streaming).get();
        let response = self.base.execute(Method::GET, STATEMENTS, config, None).await?;
        self.base
            .read_response(response, requested, payload.is_streaming())
            .await
    }

    /// Stream statements matching a pattern without buffering the body.
    pub async fn download(&self, payload: &GetStatementsPayload) -> Result<DownloadStream> {
        let requested = self.base.accept_type(payload.response_type());
        let config = self.base.statements_request(payload, true).get();
        let response = self.base.execute(Method::GET, STATEMENTS, config, None).await?;
        Ok(self.base.into_download(response, requested))
    }

    /// Add one statement to each of its graphs.
    pub async fn add(&self, payload: &AddStatementPayload) -> Result<()> {
        let quads = payload.to_quads()?;
        self.add_quads(&quads, payload.base_uri()).await
    }

    /// Add quads, serialized as N-Quads.
    pub async fn add_quads(&self, quads: &[Quad], base_uri: Option<&str>) -> Result<()> {
        self.upload(Method::POST, to_nquads(quads), mime::N_QUADS, None, base_uri)
            .await
    }

    /// Add serialized data, optionally into one graph.
    pub async fn add_data(
        &self,
        data: impl Into<Bytes>,
        content_type: &str,
        context: Option<&str>,
        base_uri: Option<&str>,
    ) -> Result<()> {
        self.upload(Method::POST, data.into(), content_type, context, base_uri)
            .await
    }

    /// Replace the repository content with quads.
    pub async fn put_quads(&self, quads: &[Quad], base_uri: Option<&str>) -> Result<()> {
        self.upload(Method::PUT, to_nquads(quads), mime::N_QUADS, None, base_uri)
            .await
    }

    /// Replace the repository content, or one graph, with serialized data.
    pub async fn put_data(
        &self,
        data: impl Into<Bytes>,
        content_type: &str,
        context: Option<&str>,
        base_uri: Option<&str>,
    ) -> Result<()> {
        self.upload(Method::PUT, data.into(), content_type, context, base_uri)
            .await
    }

    async fn upload(
        &self,
        method: Method,
        data: impl Into<Bytes>,
        content_type: &str,
        context: Option<&str>,
        base_uri: Option<&str>,
    ) -> Result<()> {
        let config = BaseRepositoryClient::data_request(content_type, context, base_uri).get();
        self.base
            .execute(method, STATEMENTS, config, Some(data.into()))
            .await?;
        Ok(())
    }

    /// Delete statements matching a pattern.
    pub async fn delete_statements(&self, payload: &GetStatementsPayload) -> Result<()> {
        let params = payload.params();
        let config = HttpRequestConfigBuilder::new()
            .set_params(param_pairs(&params))
            .get();
        self.base.execute(Method::DELETE, STATEMENTS, config, None).await?;
        Ok(())
    }

    /// Delete every statement of the repository.
    pub async fn delete_all_statements(&self) -> Result<()> {
        self.base
            .execute(Method::DELETE, STATEMENTS, HttpRequestConfig::default(), None)
            .await?;
        Ok(())
    }

    /// Execute a SPARQL update.
    pub async fn update(&self, payload: &UpdateQueryPayload) -> Result<()> {
        let encoded = payload.encode()?;
        let config = query_request(&encoded).get();
        self.base
            .execute(Method::POST, STATEMENTS, config, Some(Bytes::from(encoded.body)))
            .await?;
        Ok(())
    }

    /// Evaluate a query.
    ///
    /// The `Accept` type is the payload's response type or, when unset, the
    /// default for its query type.
    pub async fn query(&self, payload: &GetQueryPayload) -> Result<RepositoryResponse> {
        let encoded = payload.encode()?;
        let requested = payload
            .response_type()
            .unwrap_or_else(|| payload.query_type().default_response_type());
        let streaming = self.base.wants_stream(Some(requested), payload.is_streaming());
        let config = query_request(&encoded)
            .add_accept_header(requested)
            .set_timeout(self.config().read_timeout())
            .set_response_type(if streaming {
                ResponseType::Stream
            } else {
                ResponseType::Buffered
            })
            .get();
        let response = self
            .base
            .execute(Method::POST, "", config, Some(Bytes::from(encoded.body)))
            .await?;
        self.base
            .read_response(response, Some(requested), payload.is_streaming())
            .await
    }

    /// Number of statements, optionally in one graph.
    pub async fn get_size(&self, context: Option<&str>) -> Result<u64> {
        let config = BaseRepositoryClient::size_request(context).get();
        let response = self.base.execute(Method::GET, SIZE, config, None).await?;
        BaseRepositoryClient::read_size(response).await
    }

    /// Every namespace declaration.
    pub async fn get_namespaces(&self) -> Result<Vec<Namespace>> {
        let config = HttpRequestConfigBuilder::new()
            .add_accept_header(mime::SPARQL_RESULTS_JSON)
            .get();
        let response = self.base.execute(Method::GET, NAMESPACES, config, None).await?;
        let content = response.body.into_bytes().await?;
        ContentParser::SparqlJson
            .parse(&content, &ParserConfig::default())?
            .iter()
            .filter_map(RdfItem::as_solution)
            .map(|bindings| {
                Ok(Namespace::new(
                    binding_value(bindings.get("prefix"))?,
                    binding_value(bindings.get("namespace"))?,
                ))
            })
            .collect()
    }

    /// Namespace IRI bound to a prefix.
    pub async fn get_namespace(&self, prefix: &str) -> Result<String> {
        let config = HttpRequestConfigBuilder::new()
            .add_accept_header(mime::TEXT_PLAIN)
            .get();
        let response = self
            .base
            .execute(Method::GET, &namespace_path(prefix)?, config, None)
            .await?;
        BaseRepositoryClient::read_text(response).await
    }

    /// Bind a prefix to a namespace IRI.
    pub async fn save_namespace(&self, prefix: &str, namespace: &str) -> Result<()> {
        if namespace.is_empty() {
            return Err(GraphDbError::Config("namespace is empty".to_string()));
        }
        let config = HttpRequestConfigBuilder::new()
            .add_content_type_header(mime::TEXT_PLAIN)
            .get();
        self.base
            .execute(
                Method::PUT,
                &namespace_path(prefix)?,
                config,
                Some(Bytes::from(namespace.to_string())),
            )
            .await?;
        Ok(())
    }

    /// Remove a prefix binding.
    pub async fn delete_namespace(&self, prefix: &str) -> Result<()> {
        self.base
            .execute(Method::DELETE, &namespace_path(prefix)?, HttpRequestConfig::default(), None)
            .await?;
        Ok(())
    }

    /// Remove every prefix binding.
    pub async fn delete_all_namespaces(&self) -> Result<()> {
        self.base
            .execute(Method::DELETE, NAMESPACES, HttpRequestConfig::default(), None)
            .await?;
        Ok(())
    }

    /// Open a transaction.
    ///
    /// The server answers with the transaction URL in `Location`; the returned
    /// client sends every operation there.
    pub async fn begin_transaction(
        &self,
        isolation_level: Option<TransactionIsolationLevel>,
    ) -> Result<TransactionalRepositoryClient> {
        let isolation = isolation_level.map(|level| level.iri());
        let config = HttpRequestConfigBuilder::new()
            .add_param("isolation-level", isolation.as_deref())
            .get();
        let response = self
            .base
            .execute(Method::POST, TRANSACTIONS, config, None)
            .await?;
        let location = find_header(&response.headers, "Location")
            .ok_or_else(|| GraphDbError::MissingHeader("Location".to_string()))?;
        let url = resolve_location(&response.url, location)?;

        let base = self.base.derive(vec![url.clone()])?;
        let transaction = TransactionalRepositoryClient::new(base, url, isolation_level);
        self.base.log(
            LogLevel::Info,
            &format!("transaction {} started at {}", transaction.id(), transaction.url()),
        );
        Ok(transaction)
    }
}

fn query_request(encoded: &EncodedQuery) -> HttpRequestConfigBuilder {
    HttpRequestConfigBuilder::new()
        .set_params(param_pairs(&encoded.params))
        .add_content_type_header(encoded.content_type.as_str())
}

fn namespace_path(prefix: &str) -> Result<String> {
    if prefix.is_empty() || prefix.contains(['/', '?', '#']) {
        return Err(GraphDbError::Config(format!("invalid namespace prefix '{}'", prefix)));
    }
    Ok(format!("{}/{}", NAMESPACES, prefix))
}

fn binding_value(term: Option<&Term>) -> Result<String> {
    match term {
        Some(Term::Literal(literal)) => Ok(literal.value().to_string()),
        Some(Term::NamedNode(node)) => Ok(node.as_str().to_string()),
        Some(other) => Err(GraphDbError::parse(format!("unexpected namespace binding {}", other))),
        None => Err(GraphDbError::parse("namespace binding missing")),
    }
}
