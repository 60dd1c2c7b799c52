#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # graphdb_http: RDF4J / GraphDB repository client
//!
//! An async client for triplestores speaking the RDF4J REST protocol, such as
//! GraphDB. It reads and writes statements, evaluates SPARQL queries and
//! updates, manages namespaces and runs server-side transactions, while hiding
//! content negotiation across the RDF serialization formats.
//!
//! ## Overview
//!
//! ```text
//! payload ──► RdfRepositoryClient ──► HttpRequestConfigBuilder
//!                                          │
//!                                          ▼
//!                          EndpointPool::execute (failover)
//!                                          │
//!                                          ▼
//!             ParserRegistry ──► items, lazy stream or raw text
//! ```
//!
//! - **Failover**: a repository may be served by several endpoints. Requests
//!   start at the endpoint that last answered and move on when one is down.
//! - **Content negotiation**: the `Accept` type comes from the payload or the
//!   configured default; the response `Content-Type` selects the parser.
//! - **Streaming**: large results are parsed lazily with bounded buffering.
//!   JSON-LD is always streamed.
//! - **Transactions**: `begin_transaction` returns a client bound to the
//!   transaction URL; it refuses every operation once committed or rolled back.
//!
//! ## Module Structure
//!
//! - **[repository]** - repository and server clients, configuration, statement payloads
//! - **[transaction]** - transaction client, status and isolation levels
//! - **[query]** - SPARQL query and update payloads
//! - **[parser]** - parser registry, per-format parsers, streaming
//! - **[http]** - transport, request configuration, endpoint pool, MIME types
//! - **[model]** - RDF terms and string conversion
//! - **[types]** - values returned by repository operations
//! - **[logging]** - pluggable logger
//! - **[error]** - error types and result handling

pub mod error;
pub mod http;
pub mod logging;
pub mod model;
pub mod parser;
pub mod query;
pub mod repository;
pub mod transaction;
pub mod types;

pub use error::{GraphDbError, Result};
pub use parser::{ContentParser, ParserConfig, ParserRegistry, RdfItemStream};
pub use query::{GetQueryPayload, QueryLanguage, QueryType, UpdateQueryPayload};
pub use repository::{
    AddStatementPayload, GetStatementsPayload, GraphDbServerClient, RdfRepositoryClient, RepositoryClientConfig,
    RepositoryConfig, RepositoryType,
};
pub use transaction::{TransactionIsolationLevel, TransactionStatus, TransactionalRepositoryClient};
pub use types::{DownloadStream, Namespace, RdfItem, RepositoryResponse};
