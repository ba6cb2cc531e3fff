// src/config.rs
use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::token::decode_role;
use crate::types::UserRole;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for a [`SearchClient`](crate::client::SearchClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bearer token sent on every request, when present.
    pub token: Option<String>,
    /// Role deciding the API path prefix.
    pub role: UserRole,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, role: UserRole) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            role,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build from `GISUL_API_URL` and `GISUL_TOKEN`. When a token is set,
    /// the role comes from its claims; otherwise the client role is assumed.
    pub fn from_env() -> Result<Self> {
        let base_url =
            env::var("GISUL_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        let token = env::var("GISUL_TOKEN").ok().filter(|t| !t.is_empty());

        let role = match &token {
            Some(t) => decode_role(t)?,
            None => UserRole::Client,
        };

        let mut config = Self::new(base_url, role);
        config.token = token;
        Ok(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ClientConfig::new("http://api.test", UserRole::Admin);
        assert_eq!(config.base_url, "http://api.test");
        assert_eq!(config.role, UserRole::Admin);
        assert!(config.token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_with_token_and_timeout() {
        let config = ClientConfig::new("http://api.test", UserRole::Client)
            .with_token("abc")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
