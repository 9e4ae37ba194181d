//! Client configuration: API base URL, user agent, and the request timeout
//! applied to every call. Values can come from the environment so deployments
//! can point at a different backend without rebuilding.

use std::time::Duration;

/// Default backend location used by local development setups.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding the API base URL.
const API_URL_ENV: &str = "MENTIS_API_URL";

/// Default request timeout applied to all HTTP calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            user_agent: APP_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Loads config from the environment, keeping the default base URL when
    /// the override is unset or blank.
    #[must_use]
    pub fn from_env() -> Self {
        let override_url = std::env::var(API_URL_ENV)
            .ok()
            .and_then(|value| normalize_value(&value));

        match override_url {
            Some(url) => Self::new(url),
            None => Self::default(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Rejects empty or whitespace-only override values.
fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, DEFAULT_API_URL, normalize_value};

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  https://api.mentis.dev "),
            Some("https://api.mentis.dev".to_string())
        );
    }

    #[test]
    fn default_points_at_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert!(config.user_agent.starts_with("mentis-client/"));
    }

    #[test]
    fn with_timeout_overrides_default() {
        let config =
            ClientConfig::new("https://api.mentis.dev").with_timeout(std::time::Duration::from_secs(3));
        assert_eq!(config.timeout.as_secs(), 3);
    }
}
