//! Repository and server clients.
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RdfRepositoryClient`] | statements, queries, namespaces, transactions of one repository |
//! | [`GraphDbServerClient`] | repository listing, creation and deletion |
//! | [`RepositoryConfig`] | typed configuration of a server-side repository |
//! | [`RepositoryClientConfig`] | endpoints, headers, timeouts, logger |
//! | [`GetStatementsPayload`] | statement pattern for reads and deletes |
//! | [`AddStatementPayload`] | single statement to add |

pub(crate) mod base;
mod client;
mod config;
mod payload;
mod repository_config;
mod server;

pub use client::RdfRepositoryClient;
pub use config::{RepositoryClientConfig, RepositoryClientConfigBuilder};
pub use payload::{AddStatementPayload, GetStatementsPayload, NULL_CONTEXT};
pub use repository_config::{RepositoryConfig, RepositoryParam, RepositoryType};
pub use server::GraphDbServerClient;
