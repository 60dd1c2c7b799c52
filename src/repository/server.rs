//! Server-level operations.

use super::base::BaseRepositoryClient;
use super::client::RdfRepositoryClient;
use super::{RepositoryClientConfig, RepositoryConfig};
use crate::error::{GraphDbError, Result};
use crate::http::headers::join_path;
use crate::http::{mime, HttpRequestConfig, HttpRequestConfigBuilder, Transport};
use crate::parser::{ContentParser, ParserConfig};
use crate::types::RdfItem;
use bytes::Bytes;
use http::Method;
use oxrdf::Term;
use std::sync::Arc;

const REPOSITORIES: &str = "/repositories";
const REST_REPOSITORIES: &str = "/rest/repositories";

/// Client of a GraphDB / RDF4J server: lists, creates, checks and deletes
/// repositories and hands out repository clients.
///
/// The configured endpoints are server base URLs such as
/// `http://localhost:7200`.
///
/// # Examples
///
/// ```ignore
/// use graphdb_http::repository::{GraphDbServerClient, RepositoryClientConfig};
///
/// let server = GraphDbServerClient::new(
///     RepositoryClientConfig::builder().endpoint("http://localhost:7200").build()?,
/// )?;
/// if server.has_repository("repo1").await? {
///     let repository = server.get_repository_client("repo1")?;
///     println!("{} statements", repository.get_size(None).await?);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GraphDbServerClient {
    base: BaseRepositoryClient,
}

impl GraphDbServerClient {
    /// Create a server client sending through `reqwest`.
    pub fn new(config: RepositoryClientConfig) -> Result<Self> {
        Ok(GraphDbServerClient {
            base: BaseRepositoryClient::new(config)?,
        })
    }

    /// Create a server client sending through a custom transport.
    pub fn with_transport(config: RepositoryClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(GraphDbServerClient {
            base: BaseRepositoryClient::with_transport(config, transport)?,
        })
    }

    /// Identifiers of every repository on the server.
    pub async fn get_repository_ids(&self) -> Result<Vec<String>> {
        let config = HttpRequestConfigBuilder::new()
            .add_accept_header(mime::SPARQL_RESULTS_JSON)
            .get();
        let response = self
            .base
            .execute(Method::GET, REPOSITORIES, config, None)
            .await?;
        let content = response.body.into_bytes().await?;
        ContentParser::SparqlJson
            .parse(&content, &ParserConfig::default())?
            .iter()
            .filter_map(RdfItem::as_solution)
            .map(|bindings| match bindings.get("id") {
                Some(Term::Literal(id)) => Ok(id.value().to_string()),
                Some(other) => Err(GraphDbError::parse(format!("unexpected repository id {}", other))),
                None => Err(GraphDbError::parse("repository listing without id")),
            })
            .collect()
    }

    /// Whether a repository exists.
    pub async fn has_repository(&self, id: &str) -> Result<bool> {
        Ok(self.get_repository_ids().await?.iter().any(|existing| existing == id))
    }

    /// Create a repository from a typed configuration.
    ///
    /// The configuration is posted as JSON to GraphDB's repository management
    /// resource; the server rejects existing identifiers with a 4xx status.
    pub async fn create_repository(&self, config: &RepositoryConfig) -> Result<()> {
        check_repository_id(config.id())?;
        let body = serde_json::to_vec(config)?;
        let request = HttpRequestConfigBuilder::new()
            .add_content_type_header(mime::JSON)
            .get();
        self.base
            .execute(Method::POST, REST_REPOSITORIES, request, Some(Bytes::from(body)))
            .await?;
        Ok(())
    }

    /// Configuration of an existing repository.
    pub async fn get_repository_config(&self, id: &str) -> Result<RepositoryConfig> {
        check_repository_id(id)?;
        let request = HttpRequestConfigBuilder::new().add_accept_header(mime::JSON).get();
        let response = self
            .base
            .execute(Method::GET, &format!("{}/{}", REST_REPOSITORIES, id), request, None)
            .await?;
        let content = response.body.into_bytes().await?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Delete a repository and its content.
    pub async fn delete_repository(&self, id: &str) -> Result<()> {
        self.base
            .execute(
                Method::DELETE,
                &repository_path(id)?,
                HttpRequestConfig::default(),
                None,
            )
            .await?;
        Ok(())
    }

    /// Client of one repository, on every server endpoint, sharing this
    /// client's transport and parsers.
    pub fn get_repository_client(&self, id: &str) -> Result<RdfRepositoryClient> {
        let path = repository_path(id)?;
        let endpoints = self
            .base
            .pool()
            .endpoints()
            .iter()
            .map(|endpoint| join_path(endpoint, &path))
            .collect();
        Ok(RdfRepositoryClient::from_base(self.base.derive(endpoints)?))
    }
}

fn check_repository_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(GraphDbError::Config(format!("invalid repository id '{}'", id)));
    }
    Ok(())
}

fn repository_path(id: &str) -> Result<String> {
    check_repository_id(id)?;
    Ok(format!("{}/{}", REPOSITORIES, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryType;
    use crate::tests::support::{ok, MockTransport};

    fn server(transport: Arc<MockTransport>) -> GraphDbServerClient {
        let config = RepositoryClientConfig::builder()
            .endpoints(["http://a:7200", "http://b:7200/"])
            .build()
            .unwrap();
        GraphDbServerClient::with_transport(config, transport).unwrap()
    }

    #[tokio::test]
    async fn test_repository_ids() {
        let listing = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/repositories.srj")).unwrap();
        let transport = MockTransport::new(move |request| ok(request, mime::SPARQL_RESULTS_JSON, &listing));
        let server = server(transport.clone());

        assert_eq!(server.get_repository_ids().await.unwrap(), vec!["repo1", "repo2"]);
        assert!(server.has_repository("repo2").await.unwrap());
        assert!(!server.has_repository("repo3").await.unwrap());
        assert_eq!(transport.requests()[0].url, "http://a:7200/repositories");
    }

    #[tokio::test]
    async fn test_delete_repository() {
        let transport = MockTransport::new(|request| ok(request, "text/plain", ""));
        let server = server(transport.clone());
        server.delete_repository("repo1").await.unwrap();
        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.url, "http://a:7200/repositories/repo1");
        assert!(server.delete_repository("").await.is_err());
    }

    #[tokio::test]
    async fn test_create_repository_posts_json() {
        let transport = MockTransport::new(|request| {
            Ok(crate::http::HttpResponse::buffered(&request.url, 201, ""))
        });
        let server = server(transport.clone());
        let config = RepositoryConfig::new("repo3", RepositoryType::Graphdb)
            .with_title("Countries")
            .with_param("ruleset", "owl-horst-optimized");

        server.create_repository(&config).await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "http://a:7200/rest/repositories");
        assert_eq!(request.config.header("Content-Type"), Some(mime::JSON));
        let sent: RepositoryConfig = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(sent, config);
        assert_eq!(sent.param("ruleset").unwrap().value, "owl-horst-optimized");

        let invalid = RepositoryConfig::new("a/b", RepositoryType::Free);
        assert!(matches!(
            server.create_repository(&invalid).await,
            Err(GraphDbError::Config(_))
        ));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_repository_config_read_back() {
        let transport = MockTransport::new(|request| {
            ok(
                request,
                mime::JSON,
                r#"{"id": "repo1", "title": "Countries", "type": "se", "location": "", "params": {}}"#,
            )
        });
        let server = server(transport.clone());

        let config = server.get_repository_config("repo1").await.unwrap();
        assert_eq!(config.repository_type(), RepositoryType::Se);
        assert_eq!(config.title(), "Countries");
        assert_eq!(transport.requests()[0].url, "http://a:7200/rest/repositories/repo1");
        assert_eq!(transport.requests()[0].config.header("Accept"), Some(mime::JSON));
    }

    #[test]
    fn test_repository_client_on_every_endpoint() {
        let server = server(MockTransport::new(|request| ok(request, "text/plain", "")));
        let repository = server.get_repository_client("repo1").unwrap();
        assert_eq!(
            repository.endpoint_pool().endpoints(),
            ["http://a:7200/repositories/repo1", "http://b:7200/repositories/repo1"]
        );
        assert!(server.get_repository_client("a/b").is_err());
    }
}
