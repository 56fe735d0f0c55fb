//! Facade configuration and environment overrides.

use log::debug;
use reqwest::Client;
use reqwest::header::HeaderMap;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::error::HttpLightError;
use crate::retry::RetryPolicy;

pub const ENV_USER_AGENT: &str = "HTTPLIGHT_USER_AGENT";
pub const ENV_TIMEOUT_MS: &str = "HTTPLIGHT_TIMEOUT_MS";
pub const ENV_TOKEN: &str = "HTTPLIGHT_TOKEN";
pub const ENV_RETRY_ATTEMPTS: &str = "HTTPLIGHT_RETRY_ATTEMPTS";
pub const ENV_RETRY_DELAY_MS: &str = "HTTPLIGHT_RETRY_DELAY_MS";

/// Settings used to build a facade.
#[derive(Debug, Clone)]
pub struct HttpLightConfig {
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub bearer_token: Option<String>,
    pub default_headers: HeaderMap,
    pub retry: RetryPolicy,
}

impl Default for HttpLightConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("httplight/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
            bearer_token: None,
            default_headers: HeaderMap::new(),
            retry: RetryPolicy::default(),
        }
    }
}

impl HttpLightConfig {
    /// Default configuration with `HTTPLIGHT_*` environment overrides applied.
    pub fn from_env() -> Result<Self, HttpLightError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`HttpLightConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, HttpLightError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(user_agent) = lookup(ENV_USER_AGENT) {
            config.user_agent = user_agent;
        }

        if let Some(ms) = lookup(ENV_TIMEOUT_MS) {
            config.timeout = Some(Duration::from_millis(parse_number(ENV_TIMEOUT_MS, &ms)?));
        }

        if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.is_empty()) {
            debug!("Using {} for authentication: {}", ENV_TOKEN, mask_token(&token));
            config.bearer_token = Some(token);
        }

        let attempts = match lookup(ENV_RETRY_ATTEMPTS) {
            Some(value) => parse_number::<u32>(ENV_RETRY_ATTEMPTS, &value)?,
            None => config.retry.max_attempts(),
        };
        let delay = match lookup(ENV_RETRY_DELAY_MS) {
            Some(value) => Duration::from_millis(parse_number(ENV_RETRY_DELAY_MS, &value)?),
            None => config.retry.delay(),
        };
        config.retry = RetryPolicy::new(attempts, delay);

        Ok(config)
    }

    /// Builds the `reqwest` client that backs the default transport.
    pub fn build_client(&self) -> Result<Client, HttpLightError> {
        Client::builder()
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| HttpLightError::Transport(e.into()))
    }
}

/// Parses an unsigned setting into the width it is stored in, so values that
/// do not fit are rejected rather than wrapped.
fn parse_number<N>(name: &str, value: &str) -> Result<N, HttpLightError>
where
    N: FromStr,
    N::Err: Display,
{
    value.trim().parse::<N>().map_err(|e| HttpLightError::Config {
        name: name.to_string(),
        message: format!("{:?} is not a valid number ({})", value, e),
    })
}

/// Shows only the ends of a secret, e.g. `abcd*********wxyz`.
pub(crate) fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = HttpLightConfig::default();
        assert!(config.user_agent.starts_with("httplight/"));
        assert_eq!(config.timeout, None);
        assert_eq!(config.bearer_token, None);
        assert!(config.default_headers.is_empty());
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_from_lookup_without_overrides() {
        let config = HttpLightConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.timeout, None);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_from_lookup_applies_overrides() {
        let config = HttpLightConfig::from_lookup(lookup_from(&[
            (ENV_USER_AGENT, "my-agent"),
            (ENV_TIMEOUT_MS, "1500"),
            (ENV_TOKEN, "secret-token-value"),
            (ENV_RETRY_ATTEMPTS, "5"),
            (ENV_RETRY_DELAY_MS, " 250 "),
        ]))
        .unwrap();

        assert_eq!(config.user_agent, "my-agent");
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.bearer_token.as_deref(), Some("secret-token-value"));
        assert_eq!(config.retry, RetryPolicy::from_millis(5, 250));
    }

    #[test]
    fn test_from_lookup_ignores_empty_token() {
        let config = HttpLightConfig::from_lookup(lookup_from(&[(ENV_TOKEN, "")])).unwrap();
        assert_eq!(config.bearer_token, None);
    }

    #[test]
    fn test_from_lookup_rejects_out_of_range_retry_attempts() {
        let err = HttpLightConfig::from_lookup(lookup_from(&[(ENV_RETRY_ATTEMPTS, "4294967297")]))
            .unwrap_err();
        match err {
            HttpLightError::Config { name, message } => {
                assert_eq!(name, ENV_RETRY_ATTEMPTS);
                assert!(message.contains("4294967297"));
            }
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_lookup_rejects_invalid_number() {
        let err = HttpLightConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        match err {
            HttpLightError::Config { name, .. } => assert_eq!(name, ENV_TIMEOUT_MS),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcd1234567890wxyz"), "abcd*********wxyz");
        assert_eq!(mask_token("short"), "*********");
    }

    #[test]
    fn test_build_client() {
        assert!(HttpLightConfig::default().build_client().is_ok());
    }
}
