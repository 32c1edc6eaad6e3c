use std::sync::Arc;
use std::time::Duration;

use assert_json_diff::assert_json_eq;
use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use pgappsync_schema::model::{Field, InputValue, Schema, TypeDefinition, TypeRef};
use pgappsync_server::resolver::{ExecutionRequest, RequestAdapter, Result, SchemaBackend};
use pgappsync_server::{AppState, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Answers `post(id:)` with a post, and reports an error for any other id.
struct PostBackend;

#[async_trait]
impl SchemaBackend for PostBackend {
    async fn load_schema(&self) -> Result<Schema> {
        let mut schema = Schema::new();
        schema.insert(TypeDefinition::object(
            "Query",
            [Field::new("post", TypeRef::named("Post"))
                .argument(InputValue::new("id", TypeRef::named_nn("UUID")))],
        ));
        schema.insert(TypeDefinition::object(
            "Post",
            [Field::new("id", TypeRef::named_nn("UUID"))],
        ));
        Ok(schema)
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<Value> {
        Ok(match request.variables["id"].as_str() {
            Some("p-1") => json!({ "data": { "post": { "id": "p-1" } } }),
            _ => json!({ "data": null, "errors": [{ "message": "invalid input syntax for type uuid" }] }),
        })
    }
}

fn app() -> axum::Router {
    let adapter = RequestAdapter::new(Arc::new(PostBackend), Duration::from_secs(5));
    build_router(AppState::new(Arc::new(adapter)))
}

fn event(id: &str) -> Value {
    json!({
        "info": { "fieldName": "post", "parentTypeName": "Query", "selectionSetGraphQL": "{ id }" },
        "arguments": { "id": id },
        "identity": null,
        "stash": {}
    })
}

async fn post_invoke(body: Value) -> (StatusCode, Value) {
    let request = Request::post("/invoke")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn invoke_returns_field_value() {
    let (status, body) = post_invoke(event("p-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_json_eq!(body, json!({ "id": "p-1" }));
}

#[tokio::test]
async fn invoke_reports_execution_error() {
    let (status, body) = post_invoke(event("nope")).await;
    assert_eq!(status, StatusCode::OK);
    assert_json_eq!(
        body,
        json!({
            "errorType": "ExecutionError",
            "errorMessage": "invalid input syntax for type uuid"
        })
    );
}

#[tokio::test]
async fn batch_keeps_order_and_per_item_errors() {
    let (status, body) = post_invoke(json!([event("p-1"), event("nope"), event("p-1")])).await;
    assert_eq!(status, StatusCode::OK);
    assert_json_eq!(
        body,
        json!([
            { "id": "p-1" },
            { "errorType": "ExecutionError", "errorMessage": "invalid input syntax for type uuid" },
            { "id": "p-1" }
        ])
    );
}

#[tokio::test]
async fn malformed_event_is_rejected() {
    let request = Request::post("/invoke")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"info": {}}"#))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn healthz_reports_schema_state() {
    let request = Request::get("/healthz").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_json_eq!(body, json!({ "status": "ok", "schemaLoaded": false }));
}
