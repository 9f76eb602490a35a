//! Client configuration for the marketplace API

use std::path::PathBuf;

use anyhow::Result;

/// Configuration for the marketplace API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, including the `/api` prefix
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Optional path for the persisted bearer token; in-memory when unset
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_seconds: 30,
            token_file: None,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MARKETPLACE_API_URL`: API base URL (default: "http://localhost:8000/api")
    /// - `MARKETPLACE_HTTP_TIMEOUT_SECONDS`: request timeout (default: 30)
    /// - `MARKETPLACE_TOKEN_FILE`: bearer token file path (default: unset)
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("MARKETPLACE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".to_string());

        let timeout_seconds = std::env::var("MARKETPLACE_HTTP_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let token_file = std::env::var("MARKETPLACE_TOKEN_FILE").ok().map(PathBuf::from);

        Ok(Self {
            base_url,
            timeout_seconds,
            token_file,
        })
    }

    /// Join a relative API path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
