//! Client configuration read from the environment.

use std::time::Duration;

/// Relative default for hosts that resolve paths against their own origin.
/// `ReqwestTransport` needs an absolute `API_URL`.
pub const DEFAULT_API_URL: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the admin API; `API_URL`, default `/api`.
    pub api_url: String,
    /// Artificial latency added to every RPC call; `API_DELAY_MS`, default 0.
    pub rpc_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            rpc_delay: Duration::ZERO,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values and
    /// unparsable delays fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let api_url = lookup("API_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);
        let rpc_delay = match lookup("API_DELAY_MS").map(|v| v.parse::<u64>()) {
            Some(Ok(ms)) => Duration::from_millis(ms),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "ignoring invalid API_DELAY_MS");
                defaults.rpc_delay
            }
            None => defaults.rpc_delay,
        };
        Self { api_url, rpc_delay }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "/api");
    }

    #[test]
    fn overrides_are_applied() {
        let config = ClientConfig::from_lookup(|key| match key {
            "API_URL" => Some("http://admin.example/api".to_string()),
            "API_DELAY_MS" => Some("500".to_string()),
            _ => None,
        });
        assert_eq!(config.api_url, "http://admin.example/api");
        assert_eq!(config.rpc_delay, Duration::from_millis(500));
    }

    #[test]
    fn bad_delay_falls_back_to_zero() {
        let config = ClientConfig::from_lookup(|key| (key == "API_DELAY_MS").then(|| "soon".to_string()));
        assert_eq!(config.rpc_delay, Duration::ZERO);
    }
}
