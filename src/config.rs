//! Client configuration.
//!
//! Read once at startup and injected into the HTTP client; nothing here is
//! global.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PREDICT_PATH: &str = "/predict";
pub const DEFAULT_HEALTH_PATH: &str = "/health";

pub const ENV_API_URL: &str = "GLYCOSCREEN_API_URL";
pub const ENV_PREDICT_ENDPOINT: &str = "GLYCOSCREEN_PREDICT_ENDPOINT";
pub const ENV_HEALTH_ENDPOINT: &str = "GLYCOSCREEN_HEALTH_ENDPOINT";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "GLYCOSCREEN_REQUEST_TIMEOUT_SECS";

/// Where the prediction service lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub predict_path: String,
    pub health_path: String,
    /// `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            predict_path: DEFAULT_PREDICT_PATH.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Build from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values fall back to defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        let request_timeout = get(ENV_REQUEST_TIMEOUT_SECS).and_then(|raw| {
            match raw.parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    tracing::warn!(
                        "Ignoring {}: expected whole seconds, got {:?}",
                        ENV_REQUEST_TIMEOUT_SECS,
                        raw
                    );
                    None
                }
            }
        });

        Self {
            base_url: get(ENV_API_URL).unwrap_or(defaults.base_url),
            predict_path: get(ENV_PREDICT_ENDPOINT).unwrap_or(defaults.predict_path),
            health_path: get(ENV_HEALTH_ENDPOINT).unwrap_or(defaults.health_path),
            request_timeout,
        }
    }

    #[must_use]
    pub fn predict_url(&self) -> String {
        join_url(&self.base_url, &self.predict_path)
    }

    #[must_use]
    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }
}

/// Join base and path with exactly one `/` between them.
fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.predict_url(), "http://127.0.0.1:8000/predict");
        assert_eq!(config.health_url(), "http://127.0.0.1:8000/health");
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://diabete.example.org/"),
            (ENV_PREDICT_ENDPOINT, "api/v1/predict"),
            (ENV_REQUEST_TIMEOUT_SECS, "15"),
        ]));
        assert_eq!(config.predict_url(), "https://diabete.example.org/api/v1/predict");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "   "),
            (ENV_REQUEST_TIMEOUT_SECS, "soon"),
        ]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, None);
    }
}
