//! Tournament handlers.
//!
//! # Endpoints
//!
//! - `GET  /`                        – all tournaments, newest first
//! - `GET  /types`                   – tournament type catalog
//! - `POST /create`                  – create a tournament locally
//! - `GET  /{id}`                    – one tournament
//! - `GET  /{id}/battles`            – battles recorded so far
//! - `POST /{id}/register`           – register for matchmaking
//! - `POST /{id}/matchmaking`        – find a cross-chain opponent
//! - `POST /trigger/{workflow_type}` – trigger the `cross-chain-tournaments` workflow

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chainquest_core::entities::tournament::{ListBattles, ListTournaments};
use chainquest_core::rules::RuleError;
use chainquest_core::rules::tables::TOURNAMENT_TYPES;
use chainquest_sdk::objects::tournament::{
    BattleView, CreateTournamentRequest, MatchmakingRequest, MatchmakingResponse,
    RegisterPlayerRequest, TournamentTypeView, TournamentView,
};
use chainquest_sdk::objects::workflow::{ManualTriggerRequest, TriggeredResponse};
use kanau::processor::Processor;
use time::OffsetDateTime;

use crate::api::{ApiError, trigger};
use crate::state::AppState;

const TOURNAMENT_WORKFLOW: &str = "cross-chain-tournaments";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/types", get(types))
        .route("/create", post(create))
        .route("/trigger/{workflow_type}", post(trigger_workflow))
        .route("/{id}", get(tournament))
        .route("/{id}/battles", get(battles))
        .route("/{id}/register", post(register))
        .route("/{id}/matchmaking", post(matchmaking))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<TournamentView>>, ApiError> {
    let records = state.store().process(ListTournaments).await?;
    Ok(Json(records.iter().map(|t| t.to_view()).collect()))
}

async fn types() -> Json<Vec<TournamentTypeView>> {
    Json(TOURNAMENT_TYPES.iter().map(|t| t.to_view()).collect())
}

async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateTournamentRequest>,
) -> Result<(StatusCode, Json<TournamentView>), ApiError> {
    let kind = request
        .tournament_type
        .ok_or_else(|| RuleError::UnknownTournamentType(String::new()))?;
    let view = state
        .engine
        .create_tournament(&kind, OffsetDateTime::now_utc())
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TournamentView>, ApiError> {
    Ok(Json(state.engine.tournament(&id).await?))
}

async fn battles(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BattleView>>, ApiError> {
    // 404 for unknown ids rather than an empty list.
    state.engine.tournament(&id).await?;
    let battles = state
        .store()
        .process(ListBattles { tournament_id: id })
        .await?;
    Ok(Json(battles.iter().map(|b| b.to_view()).collect()))
}

async fn register(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RegisterPlayerRequest>,
) -> Result<Json<TournamentView>, ApiError> {
    let view = state
        .engine
        .register_player(&id, request, OffsetDateTime::now_utc())
        .await?;
    Ok(Json(view))
}

async fn matchmaking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MatchmakingRequest>,
) -> Result<Json<MatchmakingResponse>, ApiError> {
    let response = state
        .engine
        .matchmake(&id, request, OffsetDateTime::now_utc())
        .await?;
    Ok(Json(response))
}

async fn trigger_workflow(
    State(state): State<AppState>,
    Path(workflow_type): Path<String>,
    Json(request): Json<ManualTriggerRequest>,
) -> Result<Json<TriggeredResponse>, ApiError> {
    let mut parameters = match request.parameters {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        _ => {
            return Err(ApiError::BadRequest(
                "parameters must be a JSON object".to_string(),
            ));
        }
    };
    parameters.insert(
        "workflowType".to_string(),
        serde_json::Value::String(workflow_type),
    );
    let response = trigger(&state, TOURNAMENT_WORKFLOW, parameters.into()).await?;
    Ok(Json(response))
}
