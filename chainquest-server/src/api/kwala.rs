//! Kwala workflow API passthrough.
//!
//! Kwala's responses are returned untouched. Every route answers 503 while
//! the workflow API has no credentials and 502 when Kwala fails.
//!
//! # Endpoints
//!
//! - `GET  /status`                   – whether the client is configured
//! - `GET  /workflows`                – active workflows
//! - `GET  /workflows/{name}`         – workflow status
//! - `PUT  /workflows/{name}`         – replace a workflow's config
//! - `POST /workflows/{name}/trigger` – start a run
//! - `GET  /workflows/{name}/history` – recent runs

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chainquest_sdk::objects::workflow::{HistoryQuery, ManualTriggerRequest, TriggeredResponse};
use serde_json::{Value, json};

use crate::api::{ApiError, kwala_client, trigger};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/workflows", get(active_workflows))
        .route(
            "/workflows/{name}",
            get(workflow_status).put(update_workflow),
        )
        .route("/workflows/{name}/trigger", post(trigger_workflow))
        .route("/workflows/{name}/history", get(workflow_history))
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    let config = state.config.kwala().await;
    Json(json!({
        "configured": config.credentials().is_some(),
        "workspace": config.workspace_id,
        "baseUrl": config.base_url.as_str(),
    }))
}

async fn active_workflows(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let client = kwala_client(&state).await?;
    Ok(Json(client.active_workflows().await?))
}

async fn workflow_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = kwala_client(&state).await?;
    Ok(Json(client.workflow_status(&name).await?))
}

async fn update_workflow(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(config): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let client = kwala_client(&state).await?;
    let result = client.update_workflow(&name, &config).await?;
    tracing::info!(workflow = %name, "Workflow updated");
    Ok(Json(result))
}

async fn trigger_workflow(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<ManualTriggerRequest>,
) -> Result<Json<TriggeredResponse>, ApiError> {
    Ok(Json(trigger(&state, &name, request.parameters).await?))
}

async fn workflow_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let client = kwala_client(&state).await?;
    Ok(Json(client.workflow_history(&name, query.limit).await?))
}
