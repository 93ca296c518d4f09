//! App state: upstream client, image proxy client, config.

use igview_core::constants::{
    DEFAULT_CORS_ORIGINS, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, IMAGE_PROXY_USER_AGENT,
};
use igview_core::{IgviewError, Result};
use igview_upstream::{ImaiClient, ImaiConfig};

use crate::proxy;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Listen port
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Upstream client configuration
    pub imai: ImaiConfig,
}

impl ApiConfig {
    /// Creates a config with default port and CORS origins.
    pub fn new(imai: ImaiConfig) -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            imai,
        }
    }

    /// Loads `.env`, then reads `PORT`, `CORS_ORIGINS` and the `IMAI_*` variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::new(ImaiConfig::from_env()?);
        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| IgviewError::ConfigError(format!("PORT is not a valid port: '{}'", port)))?;
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.cors_origins = parse_origins(&origins);
        }
        Ok(config)
    }

    /// Sets the listen port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Shared state injected into every handler.
pub struct AppState {
    /// Server configuration
    pub config: ApiConfig,
    /// IMAI client (owns the caches and the request queue)
    pub client: ImaiClient,
    /// Plain HTTP client for the image proxy
    pub images: reqwest::Client,
}

impl AppState {
    /// Builds the upstream client and the image proxy client.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = ImaiClient::new(config.imai.clone())?;
        let images = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(IMAGE_PROXY_USER_AGENT)
            .redirect(proxy::redirect_policy())
            .build()
            .map_err(|e| IgviewError::ConfigError(format!("failed to build image proxy client: {}", e)))?;

        Ok(Self {
            config,
            client,
            images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://a.example/ , http://localhost:4200,,"),
            vec!["https://a.example".to_string(), "http://localhost:4200".to_string()]
        );
    }

    #[test]
    fn test_defaults() {
        let imai = ImaiConfig::new("k", "https://imai.co/api/").unwrap();
        let config = ApiConfig::new(imai);
        assert_eq!(config.port, 3000);
        assert!(config.cors_origins.contains(&"http://localhost:4200".to_string()));
        assert!(AppState::new(config).is_ok());
    }
}
