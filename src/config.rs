//! Client configuration loading: JSON file, built-in defaults and environment overrides.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    dao::http::ApiClientConfig,
    services::{evaluation_service::FlowOptions, event_watcher::PollSettings},
};

/// Default location on disk where the client looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/client.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SAVOIR_VIN_CONFIG_PATH";
/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "SAVOIR_VIN_API_BASE";
/// Environment variable overriding the session file location.
pub const SESSION_PATH_ENV: &str = "SAVOIR_VIN_SESSION_PATH";

const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";
const DEFAULT_SESSION_PATH: &str = ".savoir-vin/session.json";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
const DEFAULT_POLL_MAX_BACKOFF_MS: u64 = 30_000;
const DEFAULT_SUBMIT_SETTLE_MS: u64 = 800;

/// Immutable runtime configuration shared across the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the scoring API, without a trailing slash.
    pub api_base: String,
    /// Timeout applied to every API request.
    pub request_timeout: Duration,
    /// Delay between two polls of an event or of its rounds.
    pub poll_interval: Duration,
    /// Retry delay cap after consecutive poll failures.
    pub poll_max_backoff: Duration,
    /// Pause after a submission before the next round is resolved.
    pub submit_settle: Duration,
    /// File holding the persisted session.
    pub session_path: PathBuf,
    /// Offer the saved draft back when the same round is reopened.
    pub restore_drafts: bool,
}

impl ClientConfig {
    /// Load the configuration from disk, falling back to built-in defaults, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        api_base = %config.api_base,
                        "loaded client config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides looked up by variable name. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(api_base) = lookup(API_BASE_ENV) {
            self.api_base = api_base;
        }
        if let Some(session_path) = lookup(SESSION_PATH_ENV) {
            self.session_path = PathBuf::from(session_path);
        }
        self
    }

    /// Settings of the HTTP gateway.
    pub fn api_client(&self) -> ApiClientConfig {
        ApiClientConfig::new(self.api_base.clone()).with_timeout(self.request_timeout)
    }

    /// Polling timing, raised to the allowed floor.
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: self.poll_interval,
            max_backoff: self.poll_max_backoff,
        }
        .clamped()
    }

    /// Options of the evaluation flow.
    pub fn flow_options(&self) -> FlowOptions {
        FlowOptions {
            settle_delay: self.submit_settle,
            restore_drafts: self.restore_drafts,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    api_base: Option<String>,
    request_timeout_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
    poll_max_backoff_ms: Option<u64>,
    submit_settle_ms: Option<u64>,
    session_path: Option<PathBuf>,
    restore_drafts: Option<bool>,
}

impl From<RawConfig> for ClientConfig {
    fn from(value: RawConfig) -> Self {
        let millis =
            |value: Option<u64>, default: u64| Duration::from_millis(value.unwrap_or(default));
        Self {
            api_base: value
                .api_base
                .filter(|base| !base.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            request_timeout: millis(value.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS),
            poll_interval: millis(
                value.poll_interval_ms.filter(|ms| *ms > 0),
                DEFAULT_POLL_INTERVAL_MS,
            ),
            poll_max_backoff: millis(value.poll_max_backoff_ms, DEFAULT_POLL_MAX_BACKOFF_MS),
            submit_settle: millis(value.submit_settle_ms, DEFAULT_SUBMIT_SETTLE_MS),
            session_path: value
                .session_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH)),
            restore_drafts: value.restore_drafts.unwrap_or(false),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::services::event_watcher::MIN_POLL_INTERVAL;

    #[test]
    fn defaults_match_documented_values() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base, "http://localhost:8000/api/v1");
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.submit_settle, Duration::from_millis(800));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.restore_drafts);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let raw: RawConfig = serde_json::from_value(serde_json::json!({
            "api_base": "https://vinhos.example/api/v1",
            "poll_interval_ms": 500,
            "restore_drafts": true,
        }))
        .unwrap();
        let config = ClientConfig::from(raw);
        assert_eq!(config.api_base, "https://vinhos.example/api/v1");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.submit_settle, Duration::from_millis(800));
        assert!(config.restore_drafts);
    }

    #[test]
    fn zero_poll_interval_falls_back_to_default() {
        let raw: RawConfig = serde_json::from_str(r#"{ "poll_interval_ms": 0 }"#).unwrap();
        assert_eq!(ClientConfig::from(raw).poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn overrides_replace_base_and_session_path() {
        let vars = HashMap::from([
            (API_BASE_ENV, "http://10.0.0.2:8000/api/v1".to_string()),
            (SESSION_PATH_ENV, "   ".to_string()),
        ]);
        let config = ClientConfig::default().with_overrides(|key| vars.get(key).cloned());
        assert_eq!(config.api_base, "http://10.0.0.2:8000/api/v1");
        assert_eq!(config.session_path, PathBuf::from(DEFAULT_SESSION_PATH));
    }

    #[test]
    fn backoff_never_below_interval() {
        let config = ClientConfig {
            poll_interval: Duration::from_secs(5),
            poll_max_backoff: Duration::from_secs(1),
            ..ClientConfig::default()
        };
        assert_eq!(config.poll_settings().max_backoff, Duration::from_secs(5));
    }

    #[test]
    fn tiny_poll_interval_is_raised_to_the_floor() {
        let raw: RawConfig = serde_json::from_str(r#"{ "poll_interval_ms": 1 }"#).unwrap();
        let settings = ClientConfig::from(raw).poll_settings();
        assert_eq!(settings.interval, MIN_POLL_INTERVAL);
        assert!(settings.max_backoff >= MIN_POLL_INTERVAL);
    }
}
