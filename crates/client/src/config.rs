//! Portal client configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use jasmine_auth::GatePolicy;

pub const ENV_API_URL: &str = "JASMINE_API_URL";
pub const ENV_SESSION_DB: &str = "JASMINE_SESSION_DB";
pub const ENV_HTTP_TIMEOUT: &str = "JASMINE_HTTP_TIMEOUT_SECS";
pub const ENV_CACHE_TTL: &str = "JASMINE_PERMISSION_CACHE_TTL_SECS";
pub const ENV_GATE_POLICY: &str = "JASMINE_GATE_POLICY";

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}='{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to resolve a data directory for the session database; set JASMINE_SESSION_DB")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    /// Backend base URL, e.g. `http://localhost:5000/api`.
    pub api_url: String,
    /// SQLite file holding the persisted session.
    pub session_db: PathBuf,
    pub http_timeout: Duration,
    pub permission_cache_ttl: Duration,
    pub gate_policy: GatePolicy,
}

impl PortalConfig {
    pub fn new(api_url: impl Into<String>, session_db: impl Into<PathBuf>) -> Self {
        Self {
            api_url: api_url.into(),
            session_db: session_db.into(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            permission_cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            gate_policy: GatePolicy::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get(ENV_API_URL).unwrap_or_else(|| {
            tracing::warn!("{ENV_API_URL} not set; using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: ENV_API_URL,
                value: api_url,
                reason: "must start with http:// or https://".into(),
            });
        }

        let session_db = match get(ENV_SESSION_DB) {
            Some(path) => PathBuf::from(path),
            None => default_session_db()?,
        };

        let http_timeout = Duration::from_secs(parse_secs(ENV_HTTP_TIMEOUT, get(ENV_HTTP_TIMEOUT), DEFAULT_HTTP_TIMEOUT_SECS)?);
        if http_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: ENV_HTTP_TIMEOUT,
                value: "0".into(),
                reason: "timeout must be at least one second".into(),
            });
        }

        let permission_cache_ttl =
            Duration::from_secs(parse_secs(ENV_CACHE_TTL, get(ENV_CACHE_TTL), DEFAULT_CACHE_TTL_SECS)?);

        let gate_policy = match get(ENV_GATE_POLICY) {
            Some(raw) => raw.parse().map_err(|e: jasmine_core::DomainError| ConfigError::Invalid {
                var: ENV_GATE_POLICY,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => GatePolicy::default(),
        };

        Ok(Self {
            api_url,
            session_db,
            http_timeout,
            permission_cache_ttl,
            gate_policy,
        })
    }

    /// Resolver cache lifetime in the resolver's time type.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.permission_cache_ttl).unwrap_or_else(|_| chrono::Duration::zero())
    }
}

fn parse_secs(var: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn default_session_db() -> Result<PathBuf, ConfigError> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or(ConfigError::NoDataDir)?;

    let mut path = base;
    path.push("jasmine");
    path.push("session.db");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<PortalConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PortalConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = config(&[
            (ENV_API_URL, "https://portal.example.com/api"),
            (ENV_SESSION_DB, "/tmp/jasmine-test.db"),
            (ENV_HTTP_TIMEOUT, "5"),
            (ENV_CACHE_TTL, "0"),
            (ENV_GATE_POLICY, "fail-closed"),
        ])
        .unwrap();

        assert_eq!(cfg.api_url, "https://portal.example.com/api");
        assert_eq!(cfg.session_db, PathBuf::from("/tmp/jasmine-test.db"));
        assert_eq!(cfg.http_timeout, Duration::from_secs(5));
        assert_eq!(cfg.cache_ttl(), chrono::Duration::zero());
        assert_eq!(cfg.gate_policy, GatePolicy::FailClosed);
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[(ENV_SESSION_DB, "/tmp/s.db")]).unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.gate_policy, GatePolicy::FailOpen);
        assert_eq!(cfg.cache_ttl(), chrono::Duration::seconds(60));
    }

    #[test]
    fn invalid_values_are_errors_not_defaults() {
        let err = config(&[(ENV_SESSION_DB, "/tmp/s.db"), (ENV_CACHE_TTL, "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_CACHE_TTL, .. }));

        let err = config(&[(ENV_SESSION_DB, "/tmp/s.db"), (ENV_GATE_POLICY, "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_GATE_POLICY, .. }));

        let err = config(&[(ENV_SESSION_DB, "/tmp/s.db"), (ENV_API_URL, "localhost:5000")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_API_URL, .. }));

        let err = config(&[(ENV_SESSION_DB, "/tmp/s.db"), (ENV_HTTP_TIMEOUT, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_HTTP_TIMEOUT, .. }));
    }
}
