//! Runtime configuration for the editor's HTTP gateway
//!
//! Values come from the environment, falling back to the defaults in
//! `constants`. Parsing goes through a lookup function so tests can supply
//! their own variables without touching the process environment.

use std::time::Duration;

use tracing::debug;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, ENV_AUTH_TOKEN,
    ENV_BASE_URL, ENV_CONNECT_TIMEOUT, ENV_REQUEST_TIMEOUT,
};
use crate::error::{Error, Result};

/// Connection settings for talking to the assignments backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Base URL that request paths such as `/assignments` are appended to
    pub base_url:        String,
    /// Total time allowed for one request
    pub request_timeout: Duration,
    /// Time allowed to establish the connection
    pub connect_timeout: Duration,
    /// Optional bearer token sent with every request
    pub auth_token:      Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_url:        DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            auth_token:      None,
        }
    }
}

impl EditorConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration using `lookup` to resolve variable names
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let base_url = match lookup(ENV_BASE_URL) {
            Some(url) => parse_base_url(&url)?,
            None => defaults.base_url,
        };

        let request_timeout = lookup(ENV_REQUEST_TIMEOUT)
            .map(|value| parse_seconds(ENV_REQUEST_TIMEOUT, &value))
            .transpose()?
            .unwrap_or(defaults.request_timeout);

        let connect_timeout = lookup(ENV_CONNECT_TIMEOUT)
            .map(|value| parse_seconds(ENV_CONNECT_TIMEOUT, &value))
            .transpose()?
            .unwrap_or(defaults.connect_timeout);

        let auth_token = lookup(ENV_AUTH_TOKEN).filter(|token| !token.trim().is_empty());

        let config = Self {
            base_url,
            request_timeout,
            connect_timeout,
            auth_token,
        };
        debug!(
            "Loaded editor config: base_url={}, request_timeout={:?}, connect_timeout={:?}",
            config.base_url, config.request_timeout, config.connect_timeout
        );
        Ok(config)
    }
}

fn parse_base_url(value: &str) -> Result<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(Error::invalid_env(ENV_BASE_URL, value, "expected an http(s) URL").into())
    }
}

fn parse_seconds(var: &str, value: &str) -> Result<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(Error::invalid_env(var, value, "timeout must be positive").into()),
        Ok(seconds) => Ok(Duration::from_secs(seconds)),
        Err(e) => Err(Error::invalid_env(var, value, e).into()),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = EditorConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.base_url, "http://localhost:3002/api/v1");
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = EditorConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://example.test/api/"),
            (ENV_REQUEST_TIMEOUT, "5"),
            (ENV_CONNECT_TIMEOUT, " 2 "),
            (ENV_AUTH_TOKEN, "secret"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://example.test/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = EditorConfig::from_lookup(lookup_from(&[(ENV_AUTH_TOKEN, "  ")])).unwrap();
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let bad_timeout =
            EditorConfig::from_lookup(lookup_from(&[(ENV_REQUEST_TIMEOUT, "soon")])).unwrap_err();
        assert!(matches!(
            bad_timeout.current_context(),
            Error::Configuration(_)
        ));

        let zero_timeout =
            EditorConfig::from_lookup(lookup_from(&[(ENV_CONNECT_TIMEOUT, "0")])).unwrap_err();
        assert!(matches!(
            zero_timeout.current_context(),
            Error::Configuration(_)
        ));

        let bad_url =
            EditorConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "localhost:3000")])).unwrap_err();
        assert!(matches!(bad_url.current_context(), Error::Configuration(_)));
    }
}
