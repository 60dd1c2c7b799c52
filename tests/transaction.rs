use graphdb_http::http::mime;
use graphdb_http::{
    AddStatementPayload, GraphDbError, RdfRepositoryClient, RepositoryClientConfig, TransactionIsolationLevel,
    TransactionStatus, UpdateQueryPayload,
};
use mockito::Matcher;
use tokio_test::{assert_err, assert_ok};

const TX_PATH: &str = "/repositories/repo1/transactions/64a5937f";

async fn open(server: &mut mockito::ServerGuard) -> (RdfRepositoryClient, mockito::Mock) {
    let begin = server
        .mock("POST", "/repositories/repo1/transactions")
        .match_query(Matcher::UrlEncoded(
            "isolation-level".into(),
            "http://www.openrdf.org/schema/sesame#SNAPSHOT".into(),
        ))
        .with_status(201)
        .with_header("location", TX_PATH)
        .create_async()
        .await;
    let config = RepositoryClientConfig::builder()
        .endpoint(format!("{}/repositories/repo1", server.url()))
        .build()
        .unwrap();
    (RdfRepositoryClient::new(config).unwrap(), begin)
}

#[tokio::test]
async fn test_add_and_commit() {
    let mut server = mockito::Server::new_async().await;
    let (repository, begin) = open(&mut server).await;
    let add = server
        .mock("PUT", TX_PATH)
        .match_query(Matcher::UrlEncoded("action".into(), "ADD".into()))
        .match_header("content-type", mime::N_QUADS)
        .match_body("<http://example.org/s> <http://example.org/p> \"value\" .\n")
        .with_status(200)
        .create_async()
        .await;
    let update = server
        .mock("PUT", TX_PATH)
        .match_query(Matcher::UrlEncoded("action".into(), "UPDATE".into()))
        .match_header("content-type", "application/sparql-update")
        .with_status(200)
        .create_async()
        .await;
    let commit = server
        .mock("PUT", TX_PATH)
        .match_query(Matcher::UrlEncoded("action".into(), "COMMIT".into()))
        .with_status(200)
        .create_async()
        .await;

    let mut tx = assert_ok!(
        repository
            .begin_transaction(Some(TransactionIsolationLevel::Snapshot))
            .await
    );
    assert_eq!(tx.id(), "64a5937f");
    assert_eq!(tx.url(), format!("{}{}", server.url(), TX_PATH));

    assert_ok!(
        tx.add(&AddStatementPayload::new("http://example.org/s", "http://example.org/p").with_literal("value"))
            .await
    );
    assert_ok!(tx.update(&UpdateQueryPayload::new("DELETE WHERE { ?s ?p ?o }")).await);
    assert_ok!(tx.commit().await);
    assert_eq!(tx.status(), TransactionStatus::Committed);

    let err = assert_err!(tx.update(&UpdateQueryPayload::new("CLEAR ALL")).await);
    assert!(matches!(err, GraphDbError::InvalidTransactionState { .. }));

    begin.assert_async().await;
    add.assert_async().await;
    update.assert_async().await;
    commit.assert_async().await;
}

#[tokio::test]
async fn test_rollback() {
    let mut server = mockito::Server::new_async().await;
    let (repository, _begin) = open(&mut server).await;
    let rollback = server
        .mock("DELETE", TX_PATH)
        .with_status(204)
        .create_async()
        .await;
    let never = server
        .mock("PUT", TX_PATH)
        .expect(0)
        .create_async()
        .await;

    let mut tx = assert_ok!(
        repository
            .begin_transaction(Some(TransactionIsolationLevel::Snapshot))
            .await
    );
    assert_ok!(tx.rollback().await);
    assert_eq!(tx.status(), TransactionStatus::Aborted);
    assert_err!(tx.get_size(None).await);
    assert_err!(tx.commit().await);

    rollback.assert_async().await;
    never.assert_async().await;
}
