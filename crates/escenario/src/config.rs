//! Suite configuration.
//!
//! Where the values come from (file, env, CI variables) is the caller's
//! concern; this type only gives them one place to live for the duration of
//! a suite.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth::Credentials;
use crate::driver::DriverConfig;
use crate::intercept::DEFAULT_INTERCEPT_TIMEOUT_MS;

/// Configuration shared by every scenario in a suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Base URL of the application under test
    pub base_url: String,
    /// Default credentials for login bootstrap
    pub credentials: Option<Credentials>,
    /// Driver configuration handed to the engine binding
    pub driver: DriverConfig,
    /// Window for waiting on intercept aliases
    pub intercept_timeout: Duration,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            credentials: None,
            driver: DriverConfig::default(),
            intercept_timeout: Duration::from_millis(DEFAULT_INTERCEPT_TIMEOUT_MS),
        }
    }
}

impl SuiteConfig {
    /// Create a config rooted at a base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the default credentials
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the driver configuration
    #[must_use]
    pub fn driver(mut self, driver: DriverConfig) -> Self {
        self.driver = driver;
        self
    }

    /// Set the intercept wait window
    #[must_use]
    pub const fn intercept_timeout(mut self, timeout: Duration) -> Self {
        self.intercept_timeout = timeout;
        self
    }

    /// Join a path onto the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::default();
        assert!(config.base_url.is_empty());
        assert!(config.credentials.is_none());
        assert_eq!(config.intercept_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_url_join_normalizes_slashes() {
        let config = SuiteConfig::new("https://staging.example.com/");
        assert_eq!(config.url("/home/"), "https://staging.example.com/home/");
        assert_eq!(config.url("home/"), "https://staging.example.com/home/");
    }

    #[test]
    fn test_builder_chain() {
        let config = SuiteConfig::new("https://staging.example.com")
            .credentials(Credentials::new("qa@example.com", "secret"))
            .intercept_timeout(Duration::from_secs(2));
        assert!(config.credentials.is_some());
        assert_eq!(config.intercept_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_deserializes_from_json() {
        let config: SuiteConfig = serde_json::from_value(serde_json::json!({
            "base_url": "https://staging.example.com",
            "credentials": { "identifier": "qa@example.com", "secret": "pw", "invalid": [] },
            "driver": {
                "headless": true,
                "viewport_width": 1280,
                "viewport_height": 720,
                "implicit_wait": { "secs": 5, "nanos": 0 },
                "navigation_timeout": { "secs": 30, "nanos": 0 },
                "user_agent": null
            },
            "intercept_timeout": { "secs": 5, "nanos": 0 }
        }))
        .unwrap();
        assert_eq!(config.driver.viewport_width, 1280);
    }
}
