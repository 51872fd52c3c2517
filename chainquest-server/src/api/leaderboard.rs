//! Leaderboard and player ledger handlers.
//!
//! # Endpoints
//!
//! - `GET /leaderboard?limit=`  – players by prize tokens
//! - `GET /players/{address}`   – one player's ledger

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chainquest_core::entities::player::GetLeaderboard;
use chainquest_sdk::objects::player::PlayerView;
use chainquest_sdk::objects::tournament::LeaderboardEntry;
use kanau::processor::Processor;
use serde::Deserialize;

use crate::api::ApiError;
use crate::state::AppState;

const DEFAULT_LEADERBOARD_LIMIT: usize = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(leaderboard))
        .route("/players/{address}", get(player))
}

#[derive(Debug, Default, Deserialize)]
struct LeaderboardQuery {
    #[serde(default)]
    limit: Option<usize>,
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    let board = state.store().process(GetLeaderboard { limit }).await?;
    Ok(Json(board))
}

async fn player(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<PlayerView>, ApiError> {
    Ok(Json(state.engine.player(&address).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::api::test_support::{body_json, get};
    use crate::state::test_support::test_state;

    #[tokio::test]
    async fn test_empty_leaderboard() {
        let app = router().with_state(test_state(vec![]).await);
        let response = app.oneshot(get("/leaderboard?limit=5")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_player_is_not_found() {
        let app = router().with_state(test_state(vec![]).await);
        let response = app.oneshot(get("/players/0xdead")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
