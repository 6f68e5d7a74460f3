//! End-to-end tests: the engine driving the HTTP collaborators.

use std::sync::Arc;
use std::time::Duration;

use nlq_client::{ClientConfig, GeminiClient, GeminiConfig, ODataClient};
use nlq_core::{
    CallSpec, DispatchError, Dispatcher, DispatcherConfig, PagingOptions, Plan, Planner,
    QueryEngine, QueryRequest, ResultCache, RetryPolicy, SchemaRegistry, SourceError,
    SourceSchema,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CUSTOMERS_PATH: &str = "/sap/opu/odata/sap/Z_CUSTOMER_SRV/CustomerSet";

fn dispatcher(server: &MockServer) -> Dispatcher {
    let source = ODataClient::new(ClientConfig::new(server.uri())).unwrap();
    Dispatcher::new(Arc::new(source), Arc::new(ResultCache::new())).with_config(
        DispatcherConfig::new()
            .with_tenant("sap-client", "100")
            .with_retry(RetryPolicy::new().with_delay(Duration::from_millis(10))),
    )
}

fn customers_plan() -> Plan {
    Plan::from(vec![CallSpec::new("Z_CUSTOMER_SRV", "CustomerSet")])
}

#[tokio::test]
async fn test_cache_hit_skips_second_request() {
    let mock_server: MockServer = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CUSTOMERS_PATH))
        .and(query_param("sap-client", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": { "results": [{ "CustomerID": "C1" }, { "CustomerID": "C2" }] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher(&mock_server);
    let plan = customers_plan();

    let first = dispatcher.execute(&plan, &PagingOptions::default()).await.unwrap();
    let second = dispatcher.execute(&plan, &PagingOptions::default()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].data.len(), 2);
}

#[tokio::test]
async fn test_server_errors_retried_three_times() {
    let mock_server: MockServer = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let err = dispatcher(&mock_server)
        .execute(&customers_plan(), &PagingOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DispatchError::Source(SourceError::Http { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_unauthorized_not_retried() {
    let mock_server: MockServer = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = dispatcher(&mock_server)
        .execute(&customers_plan(), &PagingOptions::default())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "401 Unauthorized: check your source credentials"
    );
}

#[tokio::test]
async fn test_recovers_after_transient_failure() {
    let mock_server: MockServer = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "CustomerID": "C1" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let results = dispatcher(&mock_server)
        .execute(&customers_plan(), &PagingOptions::default())
        .await
        .unwrap();

    assert_eq!(results[0].data[0]["CustomerID"], "C1");
}

#[tokio::test]
async fn test_engine_over_http() {
    let gemini_server: MockServer = MockServer::start().await;
    let source_server: MockServer = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{
                "text": "```json\n[{\"source\": \"Z_CUSTOMER_SRV\", \"collection\": \"CustomerSet\", \"filter\": \"Country eq 'DE'\", \"select\": [\"CustomerID\"]}]\n```"
            }] } }]
        })))
        .expect(1)
        .mount(&gemini_server)
        .await;

    Mock::given(method("GET"))
        .and(path(CUSTOMERS_PATH))
        .and(query_param("$filter", "Country eq 'DE'"))
        .and(query_param("$select", "CustomerID"))
        .and(query_param("$top", "3"))
        .and(query_param("$format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": { "results": [{ "CustomerID": "C1" }] }
        })))
        .expect(1)
        .mount(&source_server)
        .await;

    let generator =
        GeminiClient::new(GeminiConfig::new("test-key").with_base_url(gemini_server.uri()))
            .unwrap();
    let registry = SchemaRegistry::new().with_source(
        SourceSchema::new("Z_CUSTOMER_SRV")
            .with_collection("CustomerSet", ["CustomerID", "Country"]),
    );
    let engine = QueryEngine::new(
        Planner::new(Arc::new(generator)).with_registry_validation(true),
        dispatcher(&source_server),
        Arc::new(registry),
    );

    let response = engine
        .ask(&QueryRequest::new("Show the first 3 German customers"))
        .await
        .unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].data[0]["CustomerID"], "C1");
    assert_eq!(response.pagination, None);
}
