//! Character handlers.
//!
//! # Endpoints
//!
//! - `GET  /evolution/thresholds`   – level threshold table
//! - `GET  /classes`                – class base stats and growth rates
//! - `GET  /{id}`                   – current character state
//! - `GET  /{id}/evolution/check`   – eligibility for the next level
//! - `POST /{id}/evolve`            – trigger the `nft-evolution` workflow

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chainquest_core::rules::tables::{CLASS_PROFILES, LEVEL_THRESHOLDS};
use chainquest_sdk::objects::character::{
    CharacterView, ClassProfileView, EligibilityQuery, EligibilityResponse, EvolveRequest,
    LevelThresholdView,
};
use chainquest_sdk::objects::workflow::TriggeredResponse;
use serde_json::json;
use time::OffsetDateTime;

use crate::api::{ApiError, trigger};
use crate::state::AppState;

const EVOLUTION_WORKFLOW: &str = "nft-evolution";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/evolution/thresholds", get(thresholds))
        .route("/classes", get(classes))
        .route("/{id}", get(character))
        .route("/{id}/evolution/check", get(check_evolution))
        .route("/{id}/evolve", post(evolve))
}

async fn thresholds() -> Json<Vec<LevelThresholdView>> {
    Json(LEVEL_THRESHOLDS.iter().map(|t| t.to_view()).collect())
}

async fn classes() -> Json<Vec<ClassProfileView>> {
    Json(CLASS_PROFILES.iter().map(|p| p.to_view()).collect())
}

async fn character(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CharacterView>, ApiError> {
    Ok(Json(state.engine.character(&id).await?))
}

fn required_owner(owner: Option<String>) -> Result<String, ApiError> {
    owner
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .ok_or_else(|| ApiError::BadRequest("owner is required".to_string()))
}

async fn check_evolution(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<EligibilityQuery>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let owner = required_owner(query.owner)?;
    let response = state
        .engine
        .check_evolution(&id, &owner, OffsetDateTime::now_utc())
        .await?;
    Ok(Json(response))
}

/// The workflow calls back through `/webhooks/evolution` once the on-chain
/// update lands; nothing changes locally here.
async fn evolve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<EvolveRequest>,
) -> Result<Json<TriggeredResponse>, ApiError> {
    let owner = required_owner(request.owner)?;
    let character = state.engine.character(&id).await?;
    let parameters = json!({
        "tokenId": character.token_id,
        "owner": owner,
        "currentLevel": character.level,
    });
    Ok(Json(trigger(&state, EVOLUTION_WORKFLOW, parameters).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chainquest_core::entities::character::Character;
    use chainquest_sdk::objects::CharacterClass;
    use tower::ServiceExt;

    use crate::api::test_support::{body_json, get, post_json};
    use crate::state::test_support::test_state;

    const OWNER: &str = "0x00000000000000000000000000000000000000aa";

    async fn app() -> Router {
        let state = test_state(vec![Character::seeded(
            "1",
            OWNER,
            CharacterClass::Warrior,
            1,
            500,
        )])
        .await;
        router().with_state(state)
    }

    #[tokio::test]
    async fn test_thresholds_table() {
        let response = app().await.oneshot(get("/evolution/thresholds")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().map(Vec::len), Some(10));
        assert_eq!(json[1]["xpRequired"], 1000);
        assert_eq!(json[4]["name"], "Master");
    }

    #[tokio::test]
    async fn test_classes_carry_growth_rates() {
        let json = body_json(app().await.oneshot(get("/classes")).await.unwrap()).await;
        assert_eq!(json[0]["class"], "warrior");
        assert_eq!(json[0]["growthRates"]["attack"], 1.2);
    }

    #[tokio::test]
    async fn test_character_lookup() {
        let app = app().await;
        let found = app.clone().oneshot(get("/1")).await.unwrap();
        assert_eq!(found.status(), StatusCode::OK);
        assert_eq!(body_json(found).await["tokenId"], "1");

        let missing = app.oneshot(get("/999")).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_check_requires_owner() {
        let response = app().await.oneshot(get("/1/evolution/check")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_check_reports_missing_experience() {
        let response = app()
            .await
            .oneshot(get(&format!("/1/evolution/check?owner={OWNER}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["eligibility"]["eligible"], false);
        assert_eq!(json["eligibility"]["reason"], "insufficient_experience");
        assert_eq!(json["eligibility"]["xpNeeded"], 500);
    }

    #[tokio::test]
    async fn test_evolve_without_kwala_is_unavailable() {
        let response = app()
            .await
            .oneshot(post_json("/1/evolve", json!({ "owner": OWNER })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
