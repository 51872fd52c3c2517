//! Kwala webhook handlers.
//!
//! Every route except `nft-activity` and `test` goes through
//! [`KwalaWebhook`], so nothing reaches the engine unsigned. A replayed event
//! id is acknowledged as a duplicate with 200 so the sender stops retrying.
//!
//! # Endpoints
//!
//! - `POST /quest-completed`
//! - `POST /evolution-check`
//! - `POST /evolution`
//! - `POST /tournament-created`
//! - `POST /battle-result`
//! - `POST /tournament-completed`
//! - `POST /nft-activity` (logged only)
//! - `POST /test` (echo)

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use chainquest_core::EngineError;
use chainquest_core::events::IntoEvent;
use chainquest_core::processors::EventOutcome;
use chainquest_sdk::objects::webhook::{
    BattleResultPayload, EvolutionCheckPayload, EvolutionPayload, NftActivityPayload,
    QuestCompletedPayload, TournamentCompletedPayload, TournamentCreatedPayload, WebhookAck,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use time::OffsetDateTime;

use crate::api::ApiError;
use crate::api::extractors::KwalaWebhook;
use crate::state::AppState;

/// Build the `/webhooks` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quest-completed", post(apply::<QuestCompletedPayload>))
        .route("/evolution-check", post(apply::<EvolutionCheckPayload>))
        .route("/evolution", post(apply::<EvolutionPayload>))
        .route("/tournament-created", post(apply::<TournamentCreatedPayload>))
        .route("/battle-result", post(apply::<BattleResultPayload>))
        .route(
            "/tournament-completed",
            post(apply::<TournamentCompletedPayload>),
        )
        .route("/nft-activity", post(nft_activity))
        .route("/test", post(echo))
}

/// Verify, convert and apply one webhook.
async fn apply<P>(
    State(state): State<AppState>,
    KwalaWebhook {
        payload,
        fallback_id,
    }: KwalaWebhook<P>,
) -> Result<Json<WebhookAck<EventOutcome>>, ApiError>
where
    P: IntoEvent + DeserializeOwned + Send + 'static,
{
    let event = payload
        .into_event(fallback_id.as_str(), OffsetDateTime::now_utc())
        .map_err(EngineError::from)?;
    let event_id = event.id.clone();
    let kind = event.kind();
    if fallback_id.keys_on_digest(&event_id) {
        tracing::warn!(
            event_id = %event_id,
            kind = %kind,
            "Webhook has no event id; identical bodies will be deduplicated"
        );
    }

    match state.engine.handle(event).await {
        Ok(outcome) => {
            tracing::info!(event_id = %event_id, kind = %kind, "Webhook processed");
            Ok(Json(WebhookAck::processed(event_id, outcome)))
        }
        Err(EngineError::Duplicate(id)) => {
            tracing::info!(event_id = %id, kind = %kind, "Duplicate webhook acknowledged");
            Ok(Json(WebhookAck::duplicate(id)))
        }
        Err(e) => {
            tracing::warn!(event_id = %event_id, kind = %kind, error = %e, "Webhook rejected");
            Err(e.into())
        }
    }
}

async fn nft_activity(Json(payload): Json<NftActivityPayload>) -> impl IntoResponse {
    tracing::info!(
        token_id = ?payload.token_id,
        from = ?payload.from,
        to = ?payload.to,
        message = ?payload.message,
        "NFT activity"
    );
    Json(json!({
        "status": "success",
        "processed": true,
        "message": "NFT activity logged",
    }))
}

async fn echo(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    tracing::debug!(body = %body, "Test webhook received");
    Json(json!({
        "status": "success",
        "message": "Test webhook received",
        "received": body,
    }))
}
