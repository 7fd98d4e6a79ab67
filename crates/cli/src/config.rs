//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional.
//!
//! - `SABORE_API_BASE_URL` - Backend base URL (default: `http://localhost:8080`)
//! - `SABORE_WINDOW_DAYS` - Growth comparison window in days (default: 30)
//! - `SABORE_TOP_N` - Items kept in the top-item ranking (default: 10)
//! - `SABORE_TREND_DAYS` - Trend look-back in days (default: 30)
//! - `SABORE_FORECAST_DAYS` - Forecast horizon in days (default: 7)
//! - `SABORE_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SABORE_RETRY_ATTEMPTS` - Attempts per request, at least 1 (default: 3)
//! - `SABORE_LOG_FORMAT` - `json` for structured logs, `text` otherwise
//! - `RUST_LOG` - Log filter (default: `info`)

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use sabore_analytics::AnalyticsConfig;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub api_base_url: Url,
    pub http_timeout: Duration,
    pub retry_attempts: u32,
    pub log_format: LogFormat,
    pub analytics: AnalyticsConfig,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    ///
    /// Analytics parameters are only parsed here. Command-line flags may
    /// still override them, so they are validated per command.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Same as [`CliConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AnalyticsConfig::default();

        let default_url =
            Url::parse(DEFAULT_API_BASE_URL).map_err(|e| invalid("SABORE_API_BASE_URL", e))?;
        let api_base_url = parse_var(&lookup, "SABORE_API_BASE_URL", default_url)?;

        let http_timeout_secs: u64 =
            parse_var(&lookup, "SABORE_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if http_timeout_secs == 0 {
            return Err(invalid("SABORE_HTTP_TIMEOUT_SECS", "must be at least 1"));
        }
        let retry_attempts: u32 =
            parse_var(&lookup, "SABORE_RETRY_ATTEMPTS", DEFAULT_RETRY_ATTEMPTS)?;
        if retry_attempts == 0 {
            return Err(invalid("SABORE_RETRY_ATTEMPTS", "must be at least 1"));
        }

        let analytics = AnalyticsConfig {
            window_days: parse_var(&lookup, "SABORE_WINDOW_DAYS", defaults.window_days)?,
            top_n: parse_var(&lookup, "SABORE_TOP_N", defaults.top_n)?,
            trend_days: parse_var(&lookup, "SABORE_TREND_DAYS", defaults.trend_days)?,
            forecast_days: parse_var(&lookup, "SABORE_FORECAST_DAYS", defaults.forecast_days)?,
        };

        Ok(Self {
            api_base_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
            retry_attempts,
            log_format: lookup("SABORE_LOG_FORMAT")
                .map(|name| LogFormat::from_name(&name))
                .unwrap_or_default(),
            analytics,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse `key` if set, otherwise use `default`.
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e: T::Err| invalid(key, e))
    })
}

fn invalid(key: &str, reason: impl Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CliConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.analytics, AnalyticsConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SABORE_API_BASE_URL", "https://api.sabore.example/v1/"),
            ("SABORE_WINDOW_DAYS", "7"),
            ("SABORE_TOP_N", " 3 "),
            ("SABORE_LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url.host_str(), Some("api.sabore.example"));
        assert_eq!(config.analytics.window_days, 7);
        assert_eq!(config.analytics.top_n, 3);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unparseable_value() {
        let err = load(&[("SABORE_TOP_N", "ten")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "SABORE_TOP_N"));
    }

    #[test]
    fn test_invalid_url() {
        let err = load(&[("SABORE_API_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_zero_retries_rejected() {
        assert!(load(&[("SABORE_RETRY_ATTEMPTS", "0")]).is_err());
        assert!(load(&[("SABORE_HTTP_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_analytics_values_left_for_command_validation() {
        let config = load(&[("SABORE_TOP_N", "0"), ("SABORE_WINDOW_DAYS", "-5")]).unwrap();
        assert_eq!(config.analytics.top_n, 0);
        assert_eq!(config.analytics.window_days, -5);
    }
}
