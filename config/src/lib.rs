//! Configuration for the EUVD client.
//!
//! Settings come from `~/.euvd/config.toml`, then environment overrides,
//! then command-line flags (applied by the binary). [`ResolvedConfig`] is the
//! `Option`-free form the rest of the program consumes.
//!
//! ```toml
//! [api]
//! base_url = "https://euvdservices.enisa.europa.eu/api"
//! timeout_secs = 10
//! user_agent = "euvd/0.1"
//!
//! [rate_limit]
//! interval_ms = 6000
//! burst = 1
//!
//! [self_test]
//! report_path = "test.txt"
//! ```
//!
//! String values may reference environment variables as `${VAR}`.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use euvd_client::{
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, EUVD_API_BASE_URL, FetcherOptions, RateLimit,
};
use serde::Deserialize;
use thiserror::Error;

/// Default self-test report location, relative to the working directory.
pub const DEFAULT_REPORT_PATH: &str = "test.txt";

/// Overrides `[api] base_url`.
pub const BASE_URL_ENV: &str = "EUVD_BASE_URL";
/// Overrides `[self_test] report_path`.
pub const REPORT_PATH_ENV: &str = "EUVD_REPORT_PATH";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EuvdConfig {
    pub api: Option<ApiConfig>,
    pub rate_limit: Option<RateLimitConfig>,
    pub self_test: Option<SelfTestConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    /// Total per-request timeout. Default: 10.
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

/// Request pacing.
///
/// The public service tolerates one request every six seconds; lowering the
/// interval is only sensible against a mirror or a local mock.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    pub interval_ms: Option<u64>,
    pub burst: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelfTestConfig {
    pub report_path: Option<String>,
}

/// Expand `${VAR}` references; unset variables expand to nothing.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl EuvdConfig {
    /// Load the user config. `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Errors are returned, not logged; the caller decides how to report them.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".euvd").join("config.toml"))
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub rate_limit: RateLimit,
    pub report_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::resolve(None, |_| None)
    }
}

impl ResolvedConfig {
    /// Resolve against the process environment.
    #[must_use]
    pub fn from_config(config: Option<&EuvdConfig>) -> Self {
        Self::resolve(config, |name| env::var(name).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve<F>(config: Option<&EuvdConfig>, lookup_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api = config.and_then(|c| c.api.as_ref());
        let rate_limit = config.and_then(|c| c.rate_limit.as_ref());
        let self_test = config.and_then(|c| c.self_test.as_ref());

        let base_url = non_blank(lookup_env(BASE_URL_ENV))
            .or_else(|| non_blank(api.and_then(|a| a.base_url.as_deref()).map(expand_env_vars)))
            .unwrap_or_else(|| EUVD_API_BASE_URL.to_string());

        let timeout = api
            .and_then(|a| a.timeout_secs)
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        let user_agent = non_blank(api.and_then(|a| a.user_agent.as_deref()).map(expand_env_vars))
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let interval = rate_limit
            .and_then(|r| r.interval_ms)
            .map_or(RateLimit::EUVD.interval, Duration::from_millis);
        let burst = rate_limit
            .and_then(|r| r.burst)
            .unwrap_or(RateLimit::EUVD.burst)
            .max(1);
        if interval < RateLimit::EUVD.interval {
            tracing::warn!(
                interval_ms = interval.as_millis(),
                "Configured request interval is shorter than the public service allows"
            );
        }

        let report_path = non_blank(lookup_env(REPORT_PATH_ENV))
            .or_else(|| {
                non_blank(
                    self_test
                        .and_then(|s| s.report_path.as_deref())
                        .map(expand_env_vars),
                )
            })
            .map_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH), PathBuf::from);

        Self {
            base_url,
            timeout,
            user_agent,
            rate_limit: RateLimit::new(interval, burst),
            report_path,
        }
    }

    #[must_use]
    pub fn fetcher_options(&self) -> FetcherOptions {
        FetcherOptions {
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
            rate_limit: self.rate_limit,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
