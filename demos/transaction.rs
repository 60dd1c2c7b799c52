//! Transaction example
//!
//! Opens a snapshot transaction, adds a statement, checks it is visible inside
//! the transaction and commits.
//!
//! Run with: cargo run --example transaction -- http://localhost:7200/repositories/repo1

use graphdb_http::http::mime;
use graphdb_http::logging::TracingLogger;
use graphdb_http::{
    AddStatementPayload, GetStatementsPayload, RdfRepositoryClient, RepositoryClientConfig,
    TransactionIsolationLevel,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:7200/repositories/repo1".to_string());

    let config = RepositoryClientConfig::builder()
        .endpoint(endpoint)
        .write_timeout(60_000)
        .logger(TracingLogger::shared())
        .build()?;
    let repository = RdfRepositoryClient::new(config)?;
    repository.register_default_parsers();

    let mut tx = repository
        .begin_transaction(Some(TransactionIsolationLevel::Snapshot))
        .await?;
    println!("Transaction {} ({})", tx.id(), tx.status());

    let statement = AddStatementPayload::new(
        "http://eunis.eea.europa.eu/countries/AZ",
        "http://eunis.eea.europa.eu/rdf/schema.rdf#population",
    )
    .with_literal("7931000")
    .with_data_type("http://www.w3.org/2001/XMLSchema#integer")
    .with_context("http://example.org/graph3");

    if let Err(err) = tx.add(&statement).await {
        tx.rollback().await?;
        return Err(err.into());
    }

    let inside = tx
        .get(
            &GetStatementsPayload::new()
                .with_subject("http://eunis.eea.europa.eu/countries/AZ")
                .with_response_type(mime::N_QUADS),
        )
        .await?
        .into_quads()
        .await?;
    println!("Visible inside the transaction: {} statement(s)", inside.len());
    println!("Size inside the transaction: {}", tx.get_size(None).await?);

    tx.commit().await?;
    println!("Transaction {} ({})", tx.id(), tx.status());

    if let Err(err) = tx.get_size(None).await {
        println!("After commit: {}", err);
    }

    Ok(())
}
