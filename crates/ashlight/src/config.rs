use std::time::Duration;

use crate::errors::ClientError;

/// Environment variable holding the Ashlight API key.
pub const ENV_API_KEY: &str = "ASHLIGHT_API_KEY";

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.ashlight.dev";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection settings shared by the sync and async HTTP transports.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Bearer token attached to every request.
    pub api_key: String,
    /// Base URL of the Ashlight API.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Request and stream read timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a config with defaults and the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Builds a config from `ASHLIGHT_API_KEY`.
    ///
    /// A missing or empty key is a fatal configuration error, raised before
    /// any network call is made.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_key = std::env::var(ENV_API_KEY).unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(ClientError::config(format!(
                "{ENV_API_KEY} environment variable is not set; get your API key at https://ashlight.dev"
            )));
        }
        Ok(Self::new(api_key))
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the default timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let config = ClientConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);

        let config = ClientConfig::new("key")
            .base_url("http://localhost:3002")
            .timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "http://localhost:3002");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
