//! Configuration types for ChainQuest.
//!
//! These types represent the validated runtime configuration used by the server
//! and can be shared across crates. The actual config loading/parsing is handled
//! by the server crate.

mod kwala;
mod server;
mod webhook;

pub use kwala::KwalaConfig;
pub use server::ServerConfig;
pub use webhook::WebhookConfig;

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

/// Shared configuration state with separate locks for each section.
///
/// Sections are swapped independently on reload.
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address, CORS origins).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Webhook signature secret.
    pub webhook: Arc<RwLock<WebhookConfig>>,
    /// Workflow API settings.
    pub kwala: Arc<RwLock<KwalaConfig>>,
}

impl SharedConfig {
    pub fn new(server: ServerConfig, webhook: WebhookConfig, kwala: KwalaConfig) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            webhook: Arc::new(RwLock::new(webhook)),
            kwala: Arc::new(RwLock::new(kwala)),
        }
    }

    pub async fn server(&self) -> RwLockReadGuard<'_, ServerConfig> {
        self.server.read().await
    }

    pub async fn webhook(&self) -> RwLockReadGuard<'_, WebhookConfig> {
        self.webhook.read().await
    }

    pub async fn kwala(&self) -> RwLockReadGuard<'_, KwalaConfig> {
        self.kwala.read().await
    }

    /// Replace the reloadable sections. The listen address needs a restart.
    pub async fn reload(&self, server: ServerConfig, webhook: WebhookConfig, kwala: KwalaConfig) {
        {
            let mut current = self.server.write().await;
            current.allowed_origins = server.allowed_origins;
        }
        *self.webhook.write().await = webhook;
        *self.kwala.write().await = kwala;
    }
}
