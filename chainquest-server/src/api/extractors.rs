//! Custom Axum extractors for webhook authentication.
//!
//! `KwalaWebhook<T>` verifies the `x-kwala-signature` header against the raw
//! request body, then deserializes it. The signature covers exact bytes, so
//! the body is read in full before any JSON parsing happens.
//!
//! All cryptographic operations are delegated to [`chainquest_sdk::signature`].

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chainquest_sdk::signature::{
    self, EVENT_ID_HEADER, SIGNATURE_HEADER, SignatureError, body_digest,
};
use serde::de::DeserializeOwned;

use crate::api::error_response;
use crate::state::AppState;

/// Largest webhook body accepted.
pub const MAX_WEBHOOK_BODY: usize = 1024 * 1024;

/// A verified webhook payload.
///
/// `fallback_id` is the idempotency key to use when the payload has no
/// `eventId`.
pub struct KwalaWebhook<T> {
    pub payload: T,
    pub fallback_id: FallbackId,
}

/// Where a fallback event id came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackId {
    /// The `x-kwala-event-id` header.
    Header(String),
    /// Hex SHA-256 of the raw body. Separate deliveries with identical
    /// bodies share it and are applied once.
    Digest(String),
}

impl FallbackId {
    pub fn as_str(&self) -> &str {
        match self {
            FallbackId::Header(id) | FallbackId::Digest(id) => id,
        }
    }

    /// Whether `event_id` ended up keyed on the body digest.
    pub fn keys_on_digest(&self, event_id: &str) -> bool {
        matches!(self, FallbackId::Digest(digest) if digest == event_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookRejection {
    #[error("missing x-kwala-signature header")]
    MissingSignature,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("failed to read request body")]
    BodyReadError,
    #[error("invalid JSON body: {0}")]
    JsonError(serde_json::Error),
}

impl From<SignatureError> for WebhookRejection {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::InvalidHex | SignatureError::SignatureMismatch => {
                Self::InvalidSignature
            }
            SignatureError::Json(e) => Self::JsonError(e),
        }
    }
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        let status = match self {
            WebhookRejection::MissingSignature | WebhookRejection::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            WebhookRejection::BodyReadError | WebhookRejection::JsonError(_) => {
                StatusCode::BAD_REQUEST
            }
        };
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(reason = %self, "Rejected webhook");
        }
        error_response(status, self.to_string())
    }
}

impl<T: DeserializeOwned + Send> FromRequest<AppState> for KwalaWebhook<T> {
    type Rejection = WebhookRejection;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = req
            .headers()
            .get(SIGNATURE_HEADER)
            .ok_or(WebhookRejection::MissingSignature)?
            .to_str()
            .map_err(|_| WebhookRejection::InvalidSignature)?
            .to_owned();

        let header_id = req
            .headers()
            .get(EVENT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);

        let body = axum::body::to_bytes(req.into_body(), MAX_WEBHOOK_BODY)
            .await
            .map_err(|_| WebhookRejection::BodyReadError)?;

        let webhook = state.config.webhook().await;
        let payload = signature::verify_webhook(&header_value, &body, webhook.secret_bytes())?;
        drop(webhook);

        Ok(KwalaWebhook {
            payload,
            fallback_id: header_id
                .map(FallbackId::Header)
                .unwrap_or_else(|| FallbackId::Digest(body_digest(&body))),
        })
    }
}
