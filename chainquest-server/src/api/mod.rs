//! HTTP API.
//!
//! - `/api/characters/*`  – character state and evolution
//! - `/api/quests/*`      – quest catalog and daily quests
//! - `/api/tournaments/*` – tournaments, registration, matchmaking
//! - `/api/leaderboard`   – prize leaderboard
//! - `/api/players/*`     – per-player ledger
//! - `/api/kwala/*`       – workflow API passthrough
//! - `/webhooks/*`        – signed Kwala webhooks

use std::convert::Infallible;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chainquest_core::EngineError;
use chainquest_core::rules::RuleError;
use chainquest_core::rules::tables::TOURNAMENT_TYPES;
use chainquest_core::store::StoreError;
use chainquest_sdk::client::{ClientError, KwalaClient};
use chainquest_sdk::objects::ErrorResponse;
use chainquest_sdk::objects::workflow::TriggeredResponse;
use serde::Serialize;
use time::OffsetDateTime;

use crate::state::AppState;

mod characters;
pub mod extractors;
mod kwala;
mod leaderboard;
mod quests;
mod tournaments;
pub mod webhooks;

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/characters", characters::router())
        .nest("/quests", quests::router())
        .nest("/tournaments", tournaments::router())
        .nest("/kwala", kwala::router())
        .merge(leaderboard::router())
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors returned by API and webhook handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Engine(EngineError),
    /// The workflow API answered with an error or could not be reached.
    Upstream(ClientError),
    /// The workflow API has no credentials configured.
    KwalaUnavailable,
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl From<RuleError> for ApiError {
    fn from(e: RuleError) -> Self {
        Self::Engine(e.into())
    }
}

impl From<Infallible> for ApiError {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

impl From<ClientError> for ApiError {
    fn from(e: ClientError) -> Self {
        Self::Upstream(e)
    }
}

/// `{"status":"error","message":...}`
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnknownTournamentTypeBody {
    #[serde(flatten)]
    error: ErrorResponse,
    available_types: Vec<&'static str>,
}

/// 400 listing the known tournament types.
fn unknown_tournament_type(message: String) -> Response {
    let body = UnknownTournamentTypeBody {
        error: ErrorResponse::new(message),
        available_types: TOURNAMENT_TYPES.iter().map(|t| t.id).collect(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
            ApiError::Engine(e) => match e {
                EngineError::Validation(_) => {
                    error_response(StatusCode::BAD_REQUEST, e.to_string())
                }
                EngineError::Rule(RuleError::UnknownTournamentType(_)) => {
                    unknown_tournament_type(e.to_string())
                }
                EngineError::Rule(_) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
                EngineError::NotFound { .. } => {
                    error_response(StatusCode::NOT_FOUND, e.to_string())
                }
                EngineError::Duplicate(_) | EngineError::Conflict(_) => {
                    error_response(StatusCode::CONFLICT, e.to_string())
                }
                EngineError::Store(StoreError::CharacterExists(_))
                | EngineError::Store(StoreError::NonMonotonic { .. }) => {
                    error_response(StatusCode::CONFLICT, e.to_string())
                }
                EngineError::Store(_) => {
                    tracing::error!(error = %e, "Store rejected a commit");
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                }
            },
            ApiError::Upstream(e) => {
                tracing::warn!(error = %e, "Workflow API call failed");
                error_response(StatusCode::BAD_GATEWAY, format!("workflow API error: {e}"))
            }
            ApiError::KwalaUnavailable => error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "workflow API is not configured",
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The current workflow client, or 503 when unconfigured.
async fn kwala_client(state: &AppState) -> Result<KwalaClient, ApiError> {
    state
        .kwala
        .read()
        .await
        .clone()
        .ok_or(ApiError::KwalaUnavailable)
}

/// Trigger `workflow` and wrap Kwala's answer.
async fn trigger(
    state: &AppState,
    workflow: &str,
    parameters: serde_json::Value,
) -> Result<TriggeredResponse, ApiError> {
    let client = kwala_client(state).await?;
    let kwala_result = client.trigger_workflow(workflow, parameters.clone()).await?;
    tracing::info!(workflow = %workflow, "Workflow triggered");
    Ok(TriggeredResponse {
        status: "triggered".to_string(),
        workflow: workflow.to_string(),
        parameters,
        kwala_result,
        timestamp: OffsetDateTime::now_utc(),
    })
}
