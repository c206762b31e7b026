//! Client configuration.
//!
//! The original dashboards shipped three diverging copies of the same client
//! (`/api` vs `/api/v1` bases, three auth-storage key names, three response
//! envelope shapes). `ClientConfig` consolidates those into one typed object
//! that is validated up front and injected everywhere.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};

/// Default background poll interval. The shipped dashboards used ten minutes;
/// that value is ground truth.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

/// Default TTL for the idempotent-GET response cache.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default page size for list views.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Storage key the session token is persisted under by default.
pub const DEFAULT_TOKEN_KEY: &str = "crisp_auth_token";

/// Legacy storage key names still accepted for existing installs.
pub const LEGACY_TOKEN_KEYS: &[&str] = &["access_token", "auth"];

/// Response envelope shapes observed across backend deployments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeShape {
    /// Payload is the resource itself.
    #[default]
    Bare,
    /// Payload is nested under `data`, then the resource key.
    Data,
    /// Payload is nested under the singular resource key.
    Keyed,
}

/// Validated client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_token_key")]
    pub token_key: String,
    #[serde(default)]
    pub envelope: EnvelopeShape,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
}

const fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

const fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

const fn default_items_per_page() -> usize {
    DEFAULT_ITEMS_PER_PAGE
}

fn default_token_key() -> String {
    DEFAULT_TOKEN_KEY.to_string()
}

impl ClientConfig {
    /// Build a config for a backend base URL with all defaults.
    pub fn new(base_url: impl Into<String>) -> crate::Result<Self> {
        let config = Self {
            base_url: base_url.into(),
            token_key: default_token_key(),
            envelope: EnvelopeShape::default(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        };
        config.validated()
    }

    /// Normalize and validate, returning the cleaned-up config.
    pub fn validated(mut self) -> crate::Result<Self> {
        let base_url = normalize_text_option(Some(self.base_url)).ok_or_else(|| {
            crate::Error::Configuration("base_url must not be empty".to_string())
        })?;
        if !is_http_url(&base_url) {
            return Err(crate::Error::Configuration(
                "base_url must include http:// or https://".to_string(),
            ));
        }
        self.base_url = base_url.trim_end_matches('/').to_string();

        self.token_key = normalize_text_option(Some(self.token_key))
            .unwrap_or_else(default_token_key);
        if self.token_key != DEFAULT_TOKEN_KEY
            && !LEGACY_TOKEN_KEYS.contains(&self.token_key.as_str())
        {
            return Err(crate::Error::Configuration(format!(
                "unknown token_key '{}' (expected {DEFAULT_TOKEN_KEY} or a legacy key)",
                self.token_key
            )));
        }

        if self.poll_interval_secs == 0 {
            return Err(crate::Error::Configuration(
                "poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.items_per_page == 0 {
            return Err(crate::Error::Configuration(
                "items_per_page must be greater than zero".to_string(),
            ));
        }

        Ok(self)
    }

    /// Apply `CRISP_BASE_URL` / `CRISP_POLL_INTERVAL_SECS` env overrides.
    pub fn with_env_overrides(mut self) -> crate::Result<Self> {
        if let Some(base_url) = normalize_text_option(std::env::var("CRISP_BASE_URL").ok()) {
            self.base_url = base_url;
        }
        if let Some(interval) =
            normalize_text_option(std::env::var("CRISP_POLL_INTERVAL_SECS").ok())
        {
            self.poll_interval_secs = interval.parse().map_err(|_| {
                crate::Error::Configuration(format!(
                    "CRISP_POLL_INTERVAL_SECS must be an integer, got '{interval}'"
                ))
            })?;
        }
        self.validated()
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Parse a config from a raw JSON payload.
///
/// Public for testability — callers can exercise parsing without touching
/// the filesystem.
pub fn parse_client_config(payload: &str) -> crate::Result<ClientConfig> {
    let config: ClientConfig = serde_json::from_str(payload)?;
    config.validated()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_trims_trailing_slash_and_applies_defaults() {
        let config = ClientConfig::new("https://crisp.example.com/").unwrap();
        assert_eq!(config.base_url, "https://crisp.example.com");
        assert_eq!(config.poll_interval_secs, 600);
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.items_per_page, 10);
        assert_eq!(config.token_key, "crisp_auth_token");
    }

    #[test]
    fn rejects_missing_scheme_and_empty_url() {
        assert!(ClientConfig::new("crisp.example.com").is_err());
        assert!(ClientConfig::new("   ").is_err());
    }

    #[test]
    fn accepts_legacy_token_keys_only() {
        let payload = r#"{"base_url": "https://c.example.com", "token_key": "access_token"}"#;
        assert!(parse_client_config(payload).is_ok());

        let bad = r#"{"base_url": "https://c.example.com", "token_key": "whatever"}"#;
        assert!(parse_client_config(bad).is_err());
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        let payload = r#"{"base_url": "https://c.example.com", "surprise": 1}"#;
        let error = parse_client_config(payload).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn parse_rejects_zero_poll_interval() {
        let payload = r#"{"base_url": "https://c.example.com", "poll_interval_secs": 0}"#;
        assert!(parse_client_config(payload).is_err());
    }

    #[test]
    fn parse_reads_envelope_shape() {
        let payload = r#"{"base_url": "https://c.example.com", "envelope": "data"}"#;
        let config = parse_client_config(payload).unwrap();
        assert_eq!(config.envelope, EnvelopeShape::Data);
    }
}
