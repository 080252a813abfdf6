//! Client configuration with environment overrides.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// Public joke service.
pub const DEFAULT_BASE_URL: &str = "https://v2.jokeapi.dev";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings shared by every call made through one `JokeApi`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Token for requests whose options carry none.
    pub auth: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `JOKEAPI_BASE_URL`, `JOKEAPI_USER_AGENT`,
    /// `JOKEAPI_TIMEOUT_SECS` and `JOKEAPI_TOKEN`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup("JOKEAPI_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(user_agent) = lookup("JOKEAPI_USER_AGENT") {
            self.user_agent = user_agent;
        }
        if let Some(raw) = lookup("JOKEAPI_TIMEOUT_SECS") {
            match raw.trim().parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => warn!(value = %raw, "ignoring unparsable JOKEAPI_TIMEOUT_SECS"),
            }
        }
        if let Some(token) = lookup("JOKEAPI_TOKEN").filter(|t| !t.is_empty()) {
            self.auth = Some(token);
        }
        self
    }
}

fn default_user_agent() -> String {
    format!("jokeapi-rs/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn overlay(vars: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::default().with_overrides(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.user_agent.starts_with("jokeapi-rs/"));
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.auth, None);
    }

    #[test]
    fn env_overrides_apply() {
        let config = overlay(&[
            ("JOKEAPI_BASE_URL", "http://localhost:3000"),
            ("JOKEAPI_TIMEOUT_SECS", "3"),
            ("JOKEAPI_TOKEN", "secret"),
        ]);
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.auth.as_deref(), Some("secret"));
    }

    #[test]
    fn bad_timeout_and_empty_token_are_ignored() {
        let config = overlay(&[("JOKEAPI_TIMEOUT_SECS", "soon"), ("JOKEAPI_TOKEN", "")]);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.auth, None);
    }

    #[test]
    fn deserializes_partial_json() {
        let config: ClientConfig = serde_json::from_str(r#"{"timeout_secs": 2}"#).unwrap();
        assert_eq!(config.timeout_secs, 2);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
