//! Signed webhook delivery (Kwala-compatible sender → ChainQuest server).
//!
//! Used by tooling and integration environments to replay webhooks against a
//! ChainQuest server with the same signature scheme Kwala uses.

use reqwest::Client;
use serde::Serialize;
use url::Url;

use super::{ClientError, parse_response};
use crate::signature::{EVENT_ID_HEADER, SIGNATURE_HEADER, SignedPayload};

/// Sends HMAC-signed webhook bodies.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: Client,
    base_url: Url,
    secret: Vec<u8>,
}

impl WebhookClient {
    /// * `base_url` – root URL of the ChainQuest server.
    /// * `webhook_secret` – the shared HMAC secret.
    pub fn new(base_url: Url, webhook_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            secret: webhook_secret.into(),
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn hook_url(&self, hook: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(&format!("/webhooks/{hook}"))?)
    }

    /// `POST /webhooks/{hook}` with a signed body.
    ///
    /// `event_id`, when given, is sent as `x-kwala-event-id`.
    pub async fn deliver<T: Serialize>(
        &self,
        hook: &str,
        payload: &T,
        event_id: Option<&str>,
    ) -> Result<serde_json::Value, ClientError> {
        let signed = SignedPayload::new(payload, &self.secret)?;
        let mut request = self
            .http
            .post(self.hook_url(hook)?)
            .header(SIGNATURE_HEADER, signed.to_header())
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(id) = event_id {
            request = request.header(EVENT_ID_HEADER, id);
        }

        let resp = request.body(signed.json).send().await?;
        parse_response(resp).await
    }
}
