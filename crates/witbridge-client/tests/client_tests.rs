//! Integration tests for the access layer against a mock remote service.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use witbridge_client::{ClientConfig, ClientError, UpdateOutcome, WitClient, BATCH_CHUNK_SIZE};
use witbridge_core::{wiql, CreateFields, UpdateFields};

const ORG: &str = "contoso";
const PROJECT: &str = "platform";

fn client_for(server: &MockServer) -> WitClient {
    let config = ClientConfig::new(server.uri(), ORG, PROJECT, "secret").unwrap();
    WitClient::new(&config).unwrap()
}

fn api_path(tail: &str) -> String {
    format!("/{ORG}/{PROJECT}/_apis/{tail}")
}

fn item_json(id: u64, title: &str, work_item_type: &str) -> Value {
    json!({
        "id": id,
        "rev": 1,
        "fields": {
            "System.Title": title,
            "System.WorkItemType": work_item_type,
            "System.State": "New"
        }
    })
}

fn expected_auth() -> String {
    format!("Basic {}", BASE64.encode(":secret"))
}

#[tokio::test]
async fn run_query_posts_literal_wiql_with_pinned_version() {
    let server = MockServer::start().await;
    let wiql_text = "SELECT [System.Id] FROM WorkItems";

    Mock::given(method("POST"))
        .and(path(api_path("wit/wiql")))
        .and(query_param("api-version", "6.0"))
        .and(header("authorization", expected_auth()))
        .and(body_json(json!({ "query": wiql_text })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queryType": "flat",
            "queryResultType": "workItem",
            "asOf": "2024-05-01T12:00:00Z",
            "workItems": [{ "id": 3 }, { "id": 1 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.run_query(wiql_text).await.unwrap();

    assert_eq!(result.ids(), vec![3, 1]);
    assert_eq!(result.query_type.as_deref(), Some("flat"));
}

#[tokio::test]
async fn search_submits_the_built_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("wit/wiql")))
        .and(body_json(json!({ "query": wiql::search_query(Some("foo")) })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "workItems": [{ "id": 5 }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.search(Some("foo")).await.unwrap();

    assert_eq!(result.ids(), vec![5]);
}

#[tokio::test]
async fn get_item_expands_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("wit/workitems/42")))
        .and(query_param("$expand", "Fields"))
        .and(query_param("api-version", "6.0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(item_json(42, "Fix redirect", "Bug")),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let item = client.get_item(42).await.unwrap();

    assert_eq!(item.id, 42);
    assert_eq!(item.title(), "Fix redirect");
    assert_eq!(item.work_item_type(), "Bug");
}

#[tokio::test]
async fn get_item_maps_missing_id_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("wit/workitems/999")))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such item"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_item(999).await.unwrap_err();

    assert!(matches!(err, ClientError::NotFound(999)), "got {err:?}");
}

#[tokio::test]
async fn remote_errors_carry_operation_and_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("wit/wiql")))
        .respond_with(ResponseTemplate::new(400).set_body_string("syntax error in query"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.run_query("SELECT nonsense").await.unwrap_err();

    match err {
        ClientError::Remote { operation, status, message } => {
            assert_eq!(operation, "query work items");
            assert_eq!(status, 400);
            assert!(message.contains("syntax error"));
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

fn joined(ids: impl Iterator<Item = u64>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

#[tokio::test]
async fn get_many_chunks_sequentially_and_survives_a_failed_chunk() {
    let server = MockServer::start().await;
    let ids: Vec<u64> = (1..=450).collect();
    assert_eq!(BATCH_CHUNK_SIZE, 200);

    // Chunk 1: ids 1..=200
    Mock::given(method("GET"))
        .and(path(api_path("wit/workitems")))
        .and(query_param("ids", joined(1..=200)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "value": [item_json(1, "one", "Task"), item_json(2, "two", "Task")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Chunk 2: ids 201..=400, fails
    Mock::given(method("GET"))
        .and(path(api_path("wit/workitems")))
        .and(query_param("ids", joined(201..=400)))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .expect(1)
        .mount(&server)
        .await;

    // Chunk 3: ids 401..=450
    Mock::given(method("GET"))
        .and(path(api_path("wit/workitems")))
        .and(query_param("ids", joined(401..=450)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "value": [item_json(401, "tail", "Task")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let outcome = client.get_many(&ids).await;

    // Successful chunks survive in order; the failed chunk is reported.
    let fetched: Vec<u64> = outcome.items.iter().map(|i| i.id).collect();
    assert_eq!(fetched, vec![1, 2, 401]);
    assert!(!outcome.is_complete());
    assert_eq!(outcome.failures.len(), 1);

    let failure = &outcome.failures[0];
    assert_eq!(failure.ids.len(), 200);
    assert_eq!(failure.ids.first(), Some(&201));
    assert_eq!(failure.ids.last(), Some(&400));
    assert!(matches!(failure.error, ClientError::Remote { status: 500, .. }));
}

#[tokio::test]
async fn get_many_with_no_ids_makes_no_calls() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let outcome = client.get_many(&[]).await;

    assert!(outcome.items.is_empty());
    assert!(outcome.is_complete());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_item_posts_patch_document_to_type_endpoint() {
    let server = MockServer::start().await;

    let fields = CreateFields {
        description: Some("details".to_string()),
        ..CreateFields::default()
    };

    Mock::given(method("POST"))
        .and(path(api_path("wit/workitems/$Task")))
        .and(header("content-type", "application/json-patch+json"))
        .and(body_json(json!([
            { "op": "add", "path": "/fields/System.Title", "value": "T" },
            { "op": "add", "path": "/fields/System.Description", "value": "details" }
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(item_json(100, "T", "Task")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let item = client.create_item("Task", "T", &fields).await.unwrap();

    assert_eq!(item.id, 100);
    assert_eq!(item.title(), "T");
}

#[tokio::test]
async fn mutation_requests_carry_exactly_one_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("wit/workitems/$Task")))
        .respond_with(ResponseTemplate::new(200).set_body_json(item_json(100, "T", "Task")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.create_item("Task", "T", &CreateFields::default()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let values: Vec<_> = requests[0].headers.get_all("content-type").iter().collect();
    assert_eq!(values.len(), 1, "content-type values: {values:?}");
    assert_eq!(values[0], "application/json-patch+json");
}

#[tokio::test]
async fn update_item_patches_set_fields() {
    let server = MockServer::start().await;

    let fields = UpdateFields {
        state: Some("Resolved".to_string()),
        priority: Some(1),
        ..UpdateFields::default()
    };

    Mock::given(method("PATCH"))
        .and(path(api_path("wit/workitems/42")))
        .and(header("content-type", "application/json-patch+json"))
        .and(body_json(json!([
            { "op": "replace", "path": "/fields/System.State", "value": "Resolved" },
            { "op": "replace", "path": "/fields/Microsoft.VSTS.Common.Priority", "value": 1 }
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "rev": 2,
            "fields": { "System.Title": "T", "System.State": "Resolved" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let outcome = client.update_item(42, &fields).await.unwrap();

    match outcome {
        UpdateOutcome::Updated(item) => {
            assert_eq!(item.rev, 2);
            assert_eq!(item.state(), "Resolved");
        }
        UpdateOutcome::Unchanged => panic!("expected an updated item"),
    }
}

#[tokio::test]
async fn update_with_zero_fields_never_touches_the_transport() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let outcome = client.update_item(42, &UpdateFields::default()).await.unwrap();

    assert!(matches!(outcome, UpdateOutcome::Unchanged));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_missing_item_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(api_path("wit/workitems/999")))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such item"))
        .mount(&server)
        .await;

    let fields = UpdateFields {
        title: Some("new".to_string()),
        ..UpdateFields::default()
    };

    let client = client_for(&server);
    let err = client.update_item(999, &fields).await.unwrap_err();

    assert!(matches!(err, ClientError::NotFound(999)), "got {err:?}");
}

#[tokio::test]
async fn create_then_get_round_trip() {
    let server = MockServer::start().await;
    let created = item_json(7, "T", "Task");

    Mock::given(method("POST"))
        .and(path(api_path("wit/workitems/$Task")))
        .respond_with(ResponseTemplate::new(200).set_body_json(created.clone()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("wit/workitems/7")))
        .respond_with(ResponseTemplate::new(200).set_body_json(created))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let item = client.create_item("Task", "T", &CreateFields::default()).await.unwrap();
    let fetched = client.get_item(item.id).await.unwrap();

    assert_eq!(fetched.fields.title.as_deref(), Some("T"));
    assert_eq!(fetched.fields.work_item_type.as_deref(), Some("Task"));
}
