use graphdb_http::http::mime;
use graphdb_http::{
    ContentParser, DownloadStream, GetStatementsPayload, GraphDbError, GraphDbServerClient, Namespace,
    RdfRepositoryClient, RepositoryClientConfig, RepositoryConfig, RepositoryType,
};
use mockito::Matcher;
use oxrdf::vocab::xsd;
use oxrdf::{GraphName, Literal, NamedNode, Quad};
use tokio_test::{assert_err, assert_ok};

const AZ: &str = "http://eunis.eea.europa.eu/countries/AZ";
const POPULATION: &str = "http://eunis.eea.europa.eu/rdf/schema.rdf#population";

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)).unwrap()
}

fn repository(endpoints: Vec<String>) -> RdfRepositoryClient {
    let config = RepositoryClientConfig::builder()
        .endpoints(endpoints)
        .read_timeout(5000)
        .write_timeout(5000)
        .build()
        .unwrap();
    RdfRepositoryClient::new(config).unwrap()
}

fn population_pattern() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("subj".into(), format!("<{AZ}>")),
        Matcher::UrlEncoded("pred".into(), format!("<{POPULATION}>")),
    ])
}

#[tokio::test]
async fn test_get_population_as_ntriples() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/repositories/repo1/statements")
        .match_query(population_pattern())
        .match_header("accept", mime::N_TRIPLES)
        .with_status(200)
        .with_header("content-type", mime::N_TRIPLES)
        .with_body(fixture("statements.nt"))
        .create_async()
        .await;

    let repository = repository(vec![format!("{}/repositories/repo1", server.url())]);
    repository.register_parser(ContentParser::NTriples);

    let payload = GetStatementsPayload::new()
        .with_subject(AZ)
        .with_predicate(POPULATION)
        .with_response_type(mime::N_TRIPLES);
    let response = assert_ok!(repository.get(&payload).await);
    let quads = assert_ok!(response.into_quads().await);

    assert_eq!(
        quads,
        vec![Quad::new(
            NamedNode::new_unchecked(AZ),
            NamedNode::new_unchecked(POPULATION),
            Literal::new_typed_literal("7931000", xsd::INTEGER),
            GraphName::DefaultGraph,
        )]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_failover_to_second_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/repositories/repo1/size")
        .with_status(200)
        .with_header("content-type", mime::TEXT_PLAIN)
        .with_body("7")
        .expect(2)
        .create_async()
        .await;

    let live = format!("{}/repositories/repo1", server.url());
    let repository = repository(vec!["http://127.0.0.1:1/repositories/repo1".to_string(), live.clone()]);

    assert_eq!(assert_ok!(repository.get_size(None).await), 7);
    assert_eq!(repository.endpoint_pool().current_endpoint(), live);
    assert_eq!(assert_ok!(repository.get_size(None).await), 7);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_error_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/repositories/repo1")
        .with_status(400)
        .with_body("MALFORMED QUERY: Encountered \" \"}\"")
        .create_async()
        .await;

    let repository = repository(vec![format!("{}/repositories/repo1", server.url())]);
    let err = assert_err!(
        repository
            .query(&graphdb_http::GetQueryPayload::new("SELECT * WHERE { ?s ?p }"))
            .await
    );
    match err {
        GraphDbError::Status { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.starts_with("MALFORMED QUERY"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_download_json_ld() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repositories/repo1/statements")
        .match_header("accept", mime::JSON_LD)
        .with_status(200)
        .with_header("content-type", mime::JSON_LD)
        .with_body(fixture("statements.jsonld"))
        .create_async()
        .await;

    let repository = repository(vec![format!("{}/repositories/repo1", server.url())]);
    repository.register_default_parsers();

    let payload = GetStatementsPayload::new().with_response_type(mime::JSON_LD);
    let items = match assert_ok!(repository.download(&payload).await) {
        DownloadStream::Items(items) => assert_ok!(items.collect_items().await),
        other => panic!("unexpected download: {other:?}"),
    };
    let expected = assert_ok!(ContentParser::JsonLd.parse(fixture("statements.jsonld").as_bytes(), &Default::default()));
    assert_eq!(items, expected);
}

#[tokio::test]
async fn test_namespaces_roundtrip() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repositories/repo1/namespaces")
        .with_status(200)
        .with_header("content-type", mime::SPARQL_RESULTS_JSON)
        .with_body(fixture("namespaces.srj"))
        .create_async()
        .await;
    let save = server
        .mock("PUT", "/repositories/repo1/namespaces/ex")
        .match_header("content-type", mime::TEXT_PLAIN)
        .match_body("http://example.org/")
        .with_status(204)
        .create_async()
        .await;

    let repository = repository(vec![format!("{}/repositories/repo1", server.url())]);
    let namespaces = assert_ok!(repository.get_namespaces().await);
    assert_eq!(
        namespaces,
        vec![
            Namespace::new("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
            Namespace::new("eunis", "http://eunis.eea.europa.eu/rdf/schema.rdf#"),
        ]
    );
    assert_ok!(repository.save_namespace("ex", "http://example.org/").await);
    save.assert_async().await;
}

#[tokio::test]
async fn test_server_lists_repositories() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repositories")
        .match_header("accept", mime::SPARQL_RESULTS_JSON)
        .with_status(200)
        .with_header("content-type", mime::SPARQL_RESULTS_JSON)
        .with_body(fixture("repositories.srj"))
        .create_async()
        .await;

    let config = RepositoryClientConfig::builder()
        .endpoint(server.url())
        .build()
        .unwrap();
    let client = assert_ok!(GraphDbServerClient::new(config));
    assert_eq!(assert_ok!(client.get_repository_ids().await), vec!["repo1", "repo2"]);
    assert!(assert_ok!(client.has_repository("repo1").await));

    let repository = assert_ok!(client.get_repository_client("repo1"));
    assert_eq!(
        repository.endpoint_pool().current_endpoint(),
        format!("{}/repositories/repo1", server.url())
    );
}

#[tokio::test]
async fn test_server_creates_repository() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/rest/repositories")
        .match_header("content-type", mime::JSON)
        .match_body(Matcher::PartialJsonString(
            r#"{"id": "repo3", "type": "graphdb", "params": {"ruleset": {"value": "rdfsplus-optimized"}}}"#.to_string(),
        ))
        .with_status(201)
        .create_async()
        .await;
    server
        .mock("POST", "/rest/repositories")
        .match_body(Matcher::PartialJsonString(r#"{"id": "repo1"}"#.to_string()))
        .with_status(400)
        .with_body("Repository repo1 already exists.")
        .create_async()
        .await;

    let config = RepositoryClientConfig::builder()
        .endpoint(server.url())
        .build()
        .unwrap();
    let client = assert_ok!(GraphDbServerClient::new(config));
    assert_ok!(
        client
            .create_repository(
                &RepositoryConfig::new("repo3", RepositoryType::Graphdb).with_param("ruleset", "rdfsplus-optimized")
            )
            .await
    );
    create.assert_async().await;

    let err = assert_err!(
        client
            .create_repository(&RepositoryConfig::new("repo1", RepositoryType::Graphdb))
            .await
    );
    assert!(matches!(err, GraphDbError::Status { status: 400, .. }));
}
