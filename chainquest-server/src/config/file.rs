//! TOML file configuration structures.
//!
//! These structs directly map to the `chainquest-config.toml` file format.

use chainquest_sdk::objects::CharacterClass;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub kwala: KwalaConfig,
    /// Seed roster loaded into the entity store at startup.
    #[serde(default)]
    pub characters: Vec<SeedCharacter>,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:3001").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3001))
}

/// Inbound webhook section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Shared HMAC secret. `KWALA_WEBHOOK_SECRET` overrides it.
    #[serde(default)]
    pub secret: String,
}

/// Kwala workflow API section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KwalaConfig {
    /// API root, including any version prefix.
    #[serde(default = "default_kwala_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for KwalaConfig {
    fn default() -> Self {
        Self {
            base_url: default_kwala_base_url(),
            workspace_id: None,
            api_key: None,
        }
    }
}

fn default_kwala_base_url() -> String {
    "https://api.kwala.com/v1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCharacter {
    pub id: String,
    pub owner: String,
    pub class: CharacterClass,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub experience: u64,
}

fn default_level() -> u32 {
    1
}
