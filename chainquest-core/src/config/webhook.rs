//! Inbound webhook configuration.

/// Shared secret for the `x-kwala-signature` HMAC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    secret: Box<[u8]>,
}

impl WebhookConfig {
    pub fn new(secret: impl Into<Box<[u8]>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Get the secret key bytes for HMAC verification.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}
