//! Plumbing shared by the repository and transaction clients.

use crate::error::{GraphDbError, Result};
use crate::http::headers::content_type_essence;
use crate::http::mime;
use crate::http::utils::param_pairs;
use crate::http::{
    EndpointPool, HttpRequestConfig, HttpRequestConfigBuilder, HttpResponse, ReqwestTransport, ResponseType, Transport,
};
use crate::logging::LogLevel;
use crate::model::term_converter::to_nt_term;
use crate::parser::{ContentParser, ParserConfig, ParserRegistry};
use crate::repository::payload::{context_param, GetStatementsPayload};
use crate::repository::RepositoryClientConfig;
use crate::types::{DownloadStream, RepositoryResponse};
use bytes::Bytes;
use http::Method;
use parking_lot::RwLock;
use std::sync::Arc;

/// Endpoint pool, parser registry and transport of one client.
///
/// Cloning shares all three.
#[derive(Clone)]
pub(crate) struct BaseRepositoryClient {
    config: Arc<RepositoryClientConfig>,
    pool: Arc<EndpointPool>,
    parsers: Arc<RwLock<ParserRegistry>>,
    transport: Arc<dyn Transport>,
}

impl BaseRepositoryClient {
    /// A client sending through a `reqwest` transport built from the config.
    pub(crate) fn new(config: RepositoryClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::with_config(config.http())?);
        Self::with_transport(config, transport)
    }

    /// Fails with `Config` when the configuration does not validate.
    pub(crate) fn with_transport(config: RepositoryClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let pool = Arc::new(EndpointPool::new(&config, transport.clone()));
        Ok(BaseRepositoryClient {
            config: Arc::new(config),
            pool,
            parsers: Arc::new(RwLock::new(ParserRegistry::new())),
            transport,
        })
    }

    /// A client bound to other endpoints, sharing transport and parsers.
    pub(crate) fn derive(&self, endpoints: Vec<String>) -> Result<Self> {
        let config = self.config.for_endpoints(endpoints)?;
        let pool = Arc::new(EndpointPool::new(&config, self.transport.clone()));
        Ok(BaseRepositoryClient {
            config: Arc::new(config),
            pool,
            parsers: self.parsers.clone(),
            transport: self.transport.clone(),
        })
    }

    pub(crate) fn config(&self) -> &RepositoryClientConfig {
        &self.config
    }

    pub(crate) fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    pub(crate) fn log(&self, level: LogLevel, message: &str) {
        self.config.logger().log(level, message);
    }

    pub(crate) fn register_parser(&self, parser: ContentParser) -> Option<ContentParser> {
        let previous = self.parsers.write().register(parser);
        if previous.is_some() {
            self.log(
                LogLevel::Debug,
                &format!("parser for {} replaced", parser.supported_type()),
            );
        }
        previous
    }

    pub(crate) fn register_default_parsers(&self) {
        let mut parsers = self.parsers.write();
        for parser in ContentParser::ALL {
            parsers.register(parser);
        }
    }

    /// Registered parser for a MIME type, if any.
    pub(crate) fn registered_parser(&self, mime: &str) -> Option<ContentParser> {
        self.parsers.read().get(mime)
    }

    /// Parser for a response: its declared content type first, then the requested one.
    pub(crate) fn parser_for(&self, response: &HttpResponse, requested: Option<&str>) -> Option<ContentParser> {
        let parsers = self.parsers.read();
        response
            .content_type()
            .and_then(|mime| parsers.get(mime))
            .or_else(|| requested.and_then(|mime| parsers.get(content_type_essence(mime))))
    }

    /// Default `Accept` type of statement reads.
    pub(crate) fn accept_type<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested.or_else(|| self.config.default_rdf_mime_type())
    }

    /// Whether a read should be delivered as a stream before its response is known.
    pub(crate) fn wants_stream(&self, requested: Option<&str>, streaming: bool) -> bool {
        streaming
            || requested
                .and_then(|mime| self.registered_parser(mime))
                .is_some_and(|parser| parser.is_streaming())
    }

    /// Request for a statement read: pattern parameters, `Accept` and delivery.
    pub(crate) fn statements_request(&self, payload: &GetStatementsPayload, stream: bool) -> HttpRequestConfigBuilder {
        let params = payload.params();
        HttpRequestConfigBuilder::new()
            .set_params(param_pairs(&params))
            .add_accept_header(self.accept_type(payload.response_type()))
            .set_response_type(if stream {
                ResponseType::Stream
            } else {
                ResponseType::Buffered
            })
    }

    /// Request uploading serialized data.
    pub(crate) fn data_request(
        content_type: &str,
        context: Option<&str>,
        base_uri: Option<&str>,
    ) -> HttpRequestConfigBuilder {
        let context = context.map(context_param);
        let base_uri = base_uri.map(to_nt_term);
        HttpRequestConfigBuilder::new()
            .add_content_type_header(content_type)
            .add_param("context", context.as_deref())
            .add_param("baseURI", base_uri.as_deref())
    }

    /// Request for the statement count, optionally of one graph.
    pub(crate) fn size_request(context: Option<&str>) -> HttpRequestConfigBuilder {
        let context = context.map(context_param);
        HttpRequestConfigBuilder::new()
            .add_accept_header(mime::TEXT_PLAIN)
            .add_param("context", context.as_deref())
    }

    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        config: HttpRequestConfig,
        body: Option<Bytes>,
    ) -> Result<HttpResponse> {
        self.pool.execute(method, path, config, body).await
    }

    /// Route a response through the matching parser.
    pub(crate) async fn read_response(
        &self,
        response: HttpResponse,
        requested: Option<&str>,
        streaming: bool,
    ) -> Result<RepositoryResponse> {
        let parser = self.parser_for(&response, requested);
        let config = ParserConfig::default();
        match parser {
            Some(parser) if streaming || parser.is_streaming() => Ok(RepositoryResponse::Stream(
                parser.parse_stream(response.body.into_stream(), config),
            )),
            Some(parser) => {
                let content = response.body.into_bytes().await?;
                Ok(RepositoryResponse::Items(parser.parse(&content, &config)?))
            }
            None if streaming => Ok(RepositoryResponse::Bytes(response.body.into_stream())),
            None => Ok(RepositoryResponse::Text(response.body.into_text().await?)),
        }
    }

    /// Wrap a streamed response without buffering it.
    pub(crate) fn into_download(&self, response: HttpResponse, requested: Option<&str>) -> DownloadStream {
        match self.parser_for(&response, requested) {
            Some(parser) => DownloadStream::Items(parser.parse_stream(response.body.into_stream(), ParserConfig::default())),
            None => DownloadStream::Bytes(response.body.into_stream()),
        }
    }

    /// Plain text body, trimmed.
    pub(crate) async fn read_text(response: HttpResponse) -> Result<String> {
        Ok(response.body.into_text().await?.trim().to_string())
    }

    /// Parse a `/size` answer.
    pub(crate) async fn read_size(response: HttpResponse) -> Result<u64> {
        let text = Self::read_text(response).await?;
        text.parse::<u64>()
            .map_err(|e| GraphDbError::parse(format!("invalid repository size '{}': {}", text, e)))
    }
}

impl std::fmt::Debug for BaseRepositoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseRepositoryClient")
            .field("pool", &self.pool)
            .field("parsers", &self.parsers.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mime;
    use crate::tests::support::MockTransport;

    fn client() -> BaseRepositoryClient {
        let config = RepositoryClientConfig::builder()
            .endpoint("http://host/repositories/repo1")
            .build()
            .unwrap();
        BaseRepositoryClient::with_transport(config, MockTransport::new(|request| Ok(HttpResponse::buffered(&request.url, 200, "")))).unwrap()
    }

    #[test]
    fn test_parser_selection_prefers_response_type() {
        let client = client();
        client.register_parser(ContentParser::Turtle);
        client.register_parser(ContentParser::NTriples);

        let response = HttpResponse::buffered("http://host", 200, "").with_header("Content-Type", "text/turtle;charset=UTF-8");
        assert_eq!(client.parser_for(&response, Some(mime::N_TRIPLES)), Some(ContentParser::Turtle));

        let untyped = HttpResponse::buffered("http://host", 200, "");
        assert_eq!(client.parser_for(&untyped, Some(mime::N_TRIPLES)), Some(ContentParser::NTriples));
        assert_eq!(client.parser_for(&untyped, Some(mime::RDF_XML)), None);
    }

    #[test]
    fn test_json_ld_requests_stream() {
        let client = client();
        assert!(!client.wants_stream(Some(mime::JSON_LD), false));
        client.register_default_parsers();
        assert!(client.wants_stream(Some(mime::JSON_LD), false));
        assert!(!client.wants_stream(Some(mime::TURTLE), false));
        assert!(client.wants_stream(None, true));
    }

    #[tokio::test]
    async fn test_unparsed_response_is_text() {
        let client = client();
        let response = HttpResponse::buffered("http://host", 200, "<a> <b> <c> .").with_header("Content-Type", mime::N_TRIPLES);
        let result = client.read_response(response, Some(mime::N_TRIPLES), false).await.unwrap();
        assert_eq!(result.into_text().as_deref(), Some("<a> <b> <c> ."));
    }

    #[tokio::test]
    async fn test_size_parsing() {
        let size = BaseRepositoryClient::read_size(HttpResponse::buffered("http://host", 200, "42\n")).await.unwrap();
        assert_eq!(size, 42);
        assert!(BaseRepositoryClient::read_size(HttpResponse::buffered("http://host", 200, "many")).await.is_err());
    }

    #[test]
    fn test_derived_client_shares_parsers() {
        let client = client();
        let derived = client
            .derive(vec!["http://host/repositories/repo1/transactions/1".to_string()])
            .unwrap();
        derived.register_parser(ContentParser::TriG);
        assert_eq!(client.registered_parser(mime::TRIG), Some(ContentParser::TriG));
        assert_eq!(derived.pool().endpoints(), ["http://host/repositories/repo1/transactions/1"]);
    }
}
