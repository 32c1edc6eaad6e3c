//! Invocation endpoint for the AppSync pipeline function.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::resolver::{AdapterError, InvocationEvent, RequestAdapter};

#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<RequestAdapter>,
}

impl AppState {
    pub fn new(adapter: Arc<RequestAdapter>) -> Self {
        Self { adapter }
    }
}

/// A single event or a batch, as AppSync batch invocation sends them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Invocation {
    Batch(Vec<InvocationEvent>),
    Single(Box<InvocationEvent>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse<'a> {
    status: &'a str,
    schema_loaded: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/invoke", post(invoke))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "ok",
        schema_loaded: state.adapter.is_loaded(),
    };
    (StatusCode::OK, Json(body))
}

async fn invoke(State(state): State<AppState>, Json(invocation): Json<Invocation>) -> Response {
    match invocation {
        Invocation::Single(event) => match state.adapter.handle(&event).await {
            Ok(value) => (StatusCode::OK, Json(value)).into_response(),
            Err(err) => {
                warn!(field = %event.coordinate(), error = %err, "Invocation failed");
                (status_for(&err), Json(error_body(&err))).into_response()
            }
        },
        // Items run one after another; the pool holds a single connection.
        Invocation::Batch(events) => {
            let mut results = Vec::with_capacity(events.len());
            for event in &events {
                let item = match state.adapter.handle(event).await {
                    Ok(value) => value,
                    Err(err) => {
                        warn!(field = %event.coordinate(), error = %err, "Batch item failed");
                        error_body(&err)
                    }
                };
                results.push(item);
            }
            (StatusCode::OK, Json(results)).into_response()
        }
    }
}

/// Execution errors are the caller's to see; AppSync relays them as GraphQL
/// errors, so they are answered with 200.
fn status_for(err: &AdapterError) -> StatusCode {
    match err {
        AdapterError::Execution { .. } => StatusCode::OK,
        AdapterError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        AdapterError::Database(_) | AdapterError::Schema(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(err: &AdapterError) -> Value {
    json!({
        "errorType": err.error_type(),
        "errorMessage": err.to_string(),
    })
}
