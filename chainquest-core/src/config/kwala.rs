//! Kwala workflow API configuration.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KwalaConfig {
    /// API root, including any version prefix.
    pub base_url: Url,
    pub workspace_id: Option<String>,
    pub api_key: Option<String>,
}

impl KwalaConfig {
    /// Workspace id and API key, when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.workspace_id.as_deref(), self.api_key.as_deref()) {
            (Some(workspace), Some(key)) if !workspace.is_empty() && !key.is_empty() => {
                Some((workspace, key))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_need_both_parts() {
        let mut config = KwalaConfig {
            base_url: Url::parse("https://api.kwala.com/v1").unwrap(),
            workspace_id: Some("ws".to_string()),
            api_key: None,
        };
        assert_eq!(config.credentials(), None);
        config.api_key = Some(String::new());
        assert_eq!(config.credentials(), None);
        config.api_key = Some("key".to_string());
        assert_eq!(config.credentials(), Some(("ws", "key")));
    }
}
