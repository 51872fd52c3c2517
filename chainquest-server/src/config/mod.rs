//! Configuration module for chainquest-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::{FileConfig, SeedCharacter};
use chainquest_core::config::{KwalaConfig, ServerConfig, SharedConfig, WebhookConfig};
use chainquest_core::entities::character::Character;
use chainquest_core::rules::tables::level_threshold;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Environment variable overriding `[kwala] api_key`.
pub const ENV_KWALA_API_KEY: &str = "KWALA_API_KEY";
/// Environment variable overriding `[kwala] workspace_id`.
pub const ENV_KWALA_WORKSPACE_ID: &str = "KWALA_WORKSPACE_ID";
/// Environment variable overriding `[webhook] secret`.
pub const ENV_KWALA_WEBHOOK_SECRET: &str = "KWALA_WEBHOOK_SECRET";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid kwala base_url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub webhook: WebhookConfig,
    pub kwala: KwalaConfig,
    pub characters: Vec<Character>,
}

impl LoadedConfig {
    /// Convert the reloadable sections into a SharedConfig.
    pub fn into_shared(self) -> (SharedConfig, Vec<Character>) {
        (
            SharedConfig::new(self.server, self.webhook, self.kwala),
            self.characters,
        )
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI and environment overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_from_str(&config_content, |key| std::env::var(key).ok())
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn load_from_str(
        &self,
        content: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        apply_env_overrides(&mut file_config, env);

        validate(&file_config)?;
        build_loaded_config(file_config)
    }
}

fn apply_env_overrides(config: &mut FileConfig, env: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
    if let Some(key) = non_empty(ENV_KWALA_API_KEY) {
        config.kwala.api_key = Some(key);
    }
    if let Some(workspace) = non_empty(ENV_KWALA_WORKSPACE_ID) {
        config.kwala.workspace_id = Some(workspace);
    }
    if let Some(secret) = non_empty(ENV_KWALA_WEBHOOK_SECRET) {
        config.webhook.secret = secret;
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.webhook.secret.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "webhook secret must not be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for seed in &config.characters {
        if level_threshold(seed.level).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "character {} has unknown level {}",
                seed.id, seed.level
            )));
        }
        if !seen.insert(seed.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate character id {}",
                seed.id
            )));
        }
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
    let base_url = Url::parse(&file_config.kwala.base_url)?;

    Ok(LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
            allowed_origins: file_config.server.allowed_origins,
        },
        webhook: WebhookConfig::new(file_config.webhook.secret.into_bytes()),
        kwala: KwalaConfig {
            base_url,
            workspace_id: file_config.kwala.workspace_id,
            api_key: file_config.kwala.api_key,
        },
        characters: file_config
            .characters
            .into_iter()
            .map(convert_character)
            .collect(),
    })
}

fn convert_character(seed: SeedCharacter) -> Character {
    Character::seeded(seed.id, seed.owner, seed.class, seed.level, seed.experience)
}
