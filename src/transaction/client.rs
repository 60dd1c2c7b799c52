use super::{TransactionIsolationLevel, TransactionStatus};
use crate::error::{GraphDbError, Result};
use crate::http::mime::{self, query_content_type};
use crate::http::utils::param_pairs;
use crate::http::{HttpRequestConfig, HttpRequestConfigBuilder, HttpResponse};
use crate::logging::LogLevel;
use crate::model::term_converter::to_nquads;
use crate::parser::ContentParser;
use crate::query::{GetQueryPayload, UpdateQueryPayload};
use crate::repository::base::BaseRepositoryClient;
use crate::repository::{AddStatementPayload, GetStatementsPayload};
use crate::types::{DownloadStream, RepositoryResponse};
use bytes::Bytes;
use http::Method;
use oxrdf::Quad;

/// Value of the `action` parameter for each transaction operation.
mod action {
    pub const GET: &str = "GET";
    pub const SIZE: &str = "SIZE";
    pub const QUERY: &str = "QUERY";
    pub const UPDATE: &str = "UPDATE";
    pub const ADD: &str = "ADD";
    pub const DELETE: &str = "DELETE";
    pub const COMMIT: &str = "COMMIT";
}

/// Repository operations inside one server-side transaction.
///
/// Every operation is a `PUT` to the transaction URL with an `action`
/// parameter; rollback is a `DELETE` of that URL.
///
/// # Examples
///
/// ```ignore
/// use graphdb_http::transaction::TransactionIsolationLevel;
/// use graphdb_http::repository::AddStatementPayload;
///
/// let mut tx = repository
///     .begin_transaction(Some(TransactionIsolationLevel::Snapshot))
///     .await?;
/// tx.add(&AddStatementPayload::new("http://example.org/s", "http://example.org/p")
///     .with_literal("value"))
///     .await?;
/// tx.commit().await?;
/// ```
#[derive(Debug)]
pub struct TransactionalRepositoryClient {
    base: BaseRepositoryClient,
    url: String,
    id: String,
    isolation_level: Option<TransactionIsolationLevel>,
    status: TransactionStatus,
}

impl TransactionalRepositoryClient {
    pub(crate) fn new(
        base: BaseRepositoryClient,
        url: String,
        isolation_level: Option<TransactionIsolationLevel>,
    ) -> Self {
        let id = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        TransactionalRepositoryClient {
            base,
            url,
            id,
            isolation_level,
            status: TransactionStatus::Active,
        }
    }

    /// Server-assigned identifier, the last segment of the transaction URL.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Transaction URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Isolation level requested at creation.
    pub fn isolation_level(&self) -> Option<TransactionIsolationLevel> {
        self.isolation_level
    }

    /// Current status.
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Whether operations are still allowed.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Register a parser; shared with the repository client that opened the transaction.
    pub fn register_parser(&self, parser: ContentParser) -> Option<ContentParser> {
        self.base.register_parser(parser)
    }

    fn ensure_active(&self) -> Result<()> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(GraphDbError::InvalidTransactionState {
                id: self.id.clone(),
                status: self.status,
            })
        }
    }

    async fn perform(&self, action: &str, request: HttpRequestConfigBuilder, body: Option<Bytes>) -> Result<HttpResponse> {
        self.ensure_active()?;
        let config = request.add_param("action", action).get();
        self.base.execute(Method::PUT, "", config, body).await
    }

    fn read_timeout(&self) -> u64 {
        self.base.config().read_timeout()
    }

    /// Read statements as seen from inside the transaction.
    pub async fn get(&self, payload: &GetStatementsPayload) -> Result<RepositoryResponse> {
        let requested = self.base.accept_type(payload.response_type());
        let streaming = self.base.wants_stream(requested, payload.is_streaming());
        let request = self
            .base
            .statements_request(payload, streaming)
            .set_timeout(self.read_timeout());
        let response = self.perform(action::GET, request, None).await?;
        self.base.read_response(response, requested, payload.is_streaming()).await
    }

    /// Stream statements as seen from inside the transaction.
    pub async fn download(&self, payload: &GetStatementsPayload) -> Result<DownloadStream> {
        let request = self
            .base
            .statements_request(payload, true)
            .set_timeout(self.read_timeout());
        let response = self.perform(action::GET, request, None).await?;
        Ok(self.base.into_download(response, self.base.accept_type(payload.response_type())))
    }

    /// Number of statements, optionally in one graph.
    pub async fn get_size(&self, context: Option<&str>) -> Result<u64> {
        let request = BaseRepositoryClient::size_request(context).set_timeout(self.read_timeout());
        let response = self.perform(action::SIZE, request, None).await?;
        BaseRepositoryClient::read_size(response).await
    }

    /// Evaluate a query inside the transaction.
    pub async fn query(&self, payload: &GetQueryPayload) -> Result<RepositoryResponse> {
        let encoded = payload
            .clone()
            .with_content_type(query_content_type::SPARQL_QUERY)
            .encode()?;
        let requested = payload
            .response_type()
            .unwrap_or_else(|| payload.query_type().default_response_type());
        let request = HttpRequestConfigBuilder::new()
            .set_params(param_pairs(&encoded.params))
            .add_content_type_header(encoded.content_type.as_str())
            .add_accept_header(requested)
            .set_timeout(self.read_timeout());
        let response = self.perform(action::QUERY, request, Some(Bytes::from(encoded.body))).await?;
        self.base
            .read_response(response, Some(requested), payload.is_streaming())
            .await
    }

    /// Execute a SPARQL update inside the transaction.
    pub async fn update(&self, payload: &UpdateQueryPayload) -> Result<()> {
        let encoded = payload
            .clone()
            .with_content_type(query_content_type::SPARQL_UPDATE)
            .encode()?;
        let request = HttpRequestConfigBuilder::new()
            .set_params(param_pairs(&encoded.params))
            .add_content_type_header(encoded.content_type.as_str());
        self.perform(action::UPDATE, request, Some(Bytes::from(encoded.body)))
            .await?;
        Ok(())
    }

    /// Add a statement; commits afterwards when the payload asks for it.
    pub async fn add(&mut self, payload: &AddStatementPayload) -> Result<()> {
        self.ensure_active()?;
        let quads = payload.to_quads()?;
        self.add_quads(&quads, payload.base_uri()).await?;
        if payload.is_commit() {
            self.commit().await?;
        }
        Ok(())
    }

    /// Add quads.
    pub async fn add_quads(&self, quads: &[Quad], base_uri: Option<&str>) -> Result<()> {
        self.add_data(to_nquads(quads), mime::N_QUADS, None, base_uri).await
    }

    /// Add serialized data, optionally into one graph.
    pub async fn add_data(
        &self,
        data: impl Into<Bytes>,
        content_type: &str,
        context: Option<&str>,
        base_uri: Option<&str>,
    ) -> Result<()> {
        let request = BaseRepositoryClient::data_request(content_type, context, base_uri);
        self.perform(action::ADD, request, Some(data.into())).await?;
        Ok(())
    }

    /// Delete the statements contained in serialized data.
    pub async fn delete_data(&self, data: impl Into<Bytes>, content_type: &str) -> Result<()> {
        let request = BaseRepositoryClient::data_request(content_type, None, None);
        self.perform(action::DELETE, request, Some(data.into())).await?;
        Ok(())
    }

    /// Commit the transaction.
    ///
    /// On failure the transaction stays active.
    pub async fn commit(&mut self) -> Result<()> {
        self.perform(action::COMMIT, HttpRequestConfigBuilder::new(), None)
            .await?;
        self.status = TransactionStatus::Committed;
        self.base
            .log(LogLevel::Info, &format!("transaction {} committed", self.id));
        Ok(())
    }

    /// Roll the transaction back.
    ///
    /// On failure the transaction stays active.
    pub async fn rollback(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.base
            .execute(Method::DELETE, "", HttpRequestConfig::default(), None)
            .await?;
        self.status = TransactionStatus::Aborted;
        self.base
            .log(LogLevel::Info, &format!("transaction {} rolled back", self.id));
        Ok(())
    }
}
