//! Application state shared across all request handlers.

use chainquest_core::MemoryStore;
use chainquest_core::config::{KwalaConfig, SharedConfig};
use chainquest_core::processors::ProgressionEngine;
use chainquest_sdk::client::KwalaClient;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProgressionEngine<MemoryStore>>,
    /// Sectioned runtime configuration (reloaded via SIGHUP).
    pub config: SharedConfig,
    /// `None` while the workflow API has no credentials.
    pub kwala: Arc<RwLock<Option<KwalaClient>>>,
}

impl AppState {
    pub async fn new(engine: ProgressionEngine<MemoryStore>, config: SharedConfig) -> Self {
        let kwala = build_kwala_client(&*config.kwala().await);
        Self {
            engine: Arc::new(engine),
            config,
            kwala: Arc::new(RwLock::new(kwala)),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        self.engine.store()
    }

    /// Rebuild the workflow client from the current Kwala section.
    pub async fn refresh_kwala_client(&self) {
        let client = build_kwala_client(&*self.config.kwala().await);
        *self.kwala.write().await = client;
    }
}

pub fn build_kwala_client(config: &KwalaConfig) -> Option<KwalaClient> {
    config
        .credentials()
        .map(|(workspace, key)| KwalaClient::new(config.base_url.clone(), workspace, key))
}
