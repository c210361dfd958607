//! Client configuration.

use std::time::Duration;

use crate::error::ConfigError;

pub const BASE_URL_ENV: &str = "APP_SEARCH_BASE_URL";
pub const API_KEY_ENV: &str = "APP_SEARCH_API_KEY";
pub const TIMEOUT_ENV: &str = "APP_SEARCH_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and as whom the client talks to App Search.
///
/// The timeout is only read by transports built from the config; the client
/// itself never waits.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `APP_SEARCH_BASE_URL`, `APP_SEARCH_API_KEY` and
    /// `APP_SEARCH_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(BASE_URL_ENV))?;
        let mut config = Self::new(base_url.trim());

        if let Some(api_key) = lookup(API_KEY_ENV).filter(|value| !value.is_empty()) {
            config = config.with_api_key(api_key);
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: TIMEOUT_ENV,
                value: raw.clone(),
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}
