//! Quest handlers.
//!
//! # Endpoints
//!
//! - `GET  /`          – quest templates
//! - `GET  /{player}`  – quests offered to a player today
//! - `POST /complete`  – trigger the `quest-automation` workflow

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chainquest_core::events::{is_player_address, normalize_address};
use chainquest_core::rules::RuleError;
use chainquest_core::rules::tables::{QUEST_TEMPLATES, quest_template};
use chainquest_sdk::objects::quest::{CompleteQuestRequest, DailyQuestsResponse, QuestTemplateView};
use chainquest_sdk::objects::workflow::TriggeredResponse;
use serde_json::json;
use time::OffsetDateTime;

use crate::api::{ApiError, trigger};
use crate::state::AppState;

const QUEST_WORKFLOW: &str = "quest-automation";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(templates))
        .route("/complete", post(complete))
        .route("/{player}", get(daily))
}

async fn templates() -> Json<Vec<QuestTemplateView>> {
    Json(QUEST_TEMPLATES.iter().map(|q| q.to_view()).collect())
}

async fn daily(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Result<Json<DailyQuestsResponse>, ApiError> {
    let response = state
        .engine
        .daily_quests(&player, OffsetDateTime::now_utc())
        .await?;
    Ok(Json(response))
}

async fn complete(
    State(state): State<AppState>,
    Json(request): Json<CompleteQuestRequest>,
) -> Result<Json<TriggeredResponse>, ApiError> {
    let (Some(player), Some(quest_id)) = (request.player, request.quest_id) else {
        return Err(ApiError::BadRequest(
            "player and questId are required".to_string(),
        ));
    };
    let player = normalize_address(&player);
    if !is_player_address(&player) {
        return Err(ApiError::BadRequest(format!(
            "invalid player address: {player}"
        )));
    }
    if quest_template(&quest_id).is_none() {
        return Err(RuleError::UnknownQuest(quest_id).into());
    }

    let parameters = json!({ "player": player, "questId": quest_id });
    Ok(Json(trigger(&state, QUEST_WORKFLOW, parameters).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::api::test_support::{body_json, get, post_json};
    use crate::state::test_support::test_state;

    const PLAYER: &str = "0x1234567890abcdef1234567890abcdef12345678";

    async fn app() -> Router {
        router().with_state(test_state(vec![]).await)
    }

    #[tokio::test]
    async fn test_templates() {
        let json = body_json(app().await.oneshot(get("/")).await.unwrap()).await;
        assert_eq!(json.as_array().map(Vec::len), Some(4));
        assert_eq!(json[3]["id"], "mint_character");
        assert_eq!(json[3]["type"], "achievement");
    }

    #[tokio::test]
    async fn test_daily_quests_for_new_player() {
        let response = app().await.oneshot(get(&format!("/{PLAYER}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["quests"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["quests"][0]["progress"], 0);
    }

    #[tokio::test]
    async fn test_daily_quests_reject_bad_address() {
        let response = app().await.oneshot(get("/not-an-address")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_complete_validates_before_triggering() {
        let app = app().await;
        let missing = app
            .clone()
            .oneshot(post_json("/complete", json!({ "player": PLAYER })))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let unknown = app
            .clone()
            .oneshot(post_json(
                "/complete",
                json!({ "player": PLAYER, "questId": "slay_dragon" }),
            ))
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

        let unconfigured = app
            .oneshot(post_json(
                "/complete",
                json!({ "player": PLAYER, "questId": "daily_login" }),
            ))
            .await
            .unwrap();
        assert_eq!(unconfigured.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
