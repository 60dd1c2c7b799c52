//! Read statements from a repository
//!
//! Fetches the statements about one subject, first parsed, then as a stream.
//!
//! Run with: cargo run --example read_statements -- http://localhost:7200/repositories/repo1

use graphdb_http::http::mime;
use graphdb_http::logging::TracingLogger;
use graphdb_http::{
    DownloadStream, GetQueryPayload, GetStatementsPayload, QueryType, RdfItem, RdfRepositoryClient,
    RepositoryClientConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:7200/repositories/repo1".to_string());

    let config = RepositoryClientConfig::builder()
        .endpoint(endpoint)
        .default_rdf_mime_type(mime::TURTLE)
        .read_timeout(30_000)
        .write_timeout(30_000)
        .logger(TracingLogger::shared())
        .build()?;
    let repository = RdfRepositoryClient::new(config)?;
    repository.register_default_parsers();

    println!("Repository size: {}", repository.get_size(None).await?);

    let payload = GetStatementsPayload::new()
        .with_subject("http://eunis.eea.europa.eu/countries/AZ")
        .with_response_type(mime::N_TRIPLES);
    for quad in repository.get(&payload).await?.into_quads().await? {
        println!("  {}", quad);
    }

    println!("\nStreaming the whole repository as JSON-LD:");
    let payload = GetStatementsPayload::new().with_response_type(mime::JSON_LD);
    if let DownloadStream::Items(mut items) = repository.download(&payload).await? {
        let mut count = 0usize;
        while let Some(item) = items.next().await {
            item?;
            count += 1;
        }
        println!("  {} statements", count);
    }

    println!("\nTen classes:");
    let query = GetQueryPayload::new("SELECT DISTINCT ?class WHERE { ?s a ?class }")
        .with_query_type(QueryType::Select)
        .with_limit(10);
    for item in repository.query(&query).await?.into_items().await? {
        if let RdfItem::Solution(bindings) = item {
            if let Some(class) = bindings.get("class") {
                println!("  {}", class);
            }
        }
    }

    Ok(())
}
