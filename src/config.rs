use crate::error::{Result, UnderwritingError};
use std::time::Duration;

/// Runtime configuration of the underwriting service.
#[derive(Debug, Clone, PartialEq)]
pub struct UnderwriterConfig {
    /// Country whose states are checked against the rate-cap table.
    pub home_country: String,
    /// Upper bound on each collaborator fetch.
    pub fetch_timeout: Duration,
    /// Supply rates observed longer ago than this are refused.
    pub max_rate_age: Duration,
}

impl Default for UnderwriterConfig {
    fn default() -> Self {
        Self {
            home_country: "USA".to_string(),
            fetch_timeout: Duration::from_secs(5),
            max_rate_age: Duration::from_secs(15 * 60),
        }
    }
}

impl UnderwriterConfig {
    /// Defaults overridden by `UNDERWRITER_*` environment variables (a `.env` file is honoured).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(country) = lookup("UNDERWRITER_HOME_COUNTRY") {
            cfg.home_country = country.trim().to_string();
        }
        if let Some(ms) = lookup("UNDERWRITER_FETCH_TIMEOUT_MS") {
            cfg.fetch_timeout = Duration::from_millis(parse_u64("UNDERWRITER_FETCH_TIMEOUT_MS", &ms)?);
        }
        if let Some(secs) = lookup("UNDERWRITER_MAX_RATE_AGE_SECS") {
            cfg.max_rate_age = Duration::from_secs(parse_u64("UNDERWRITER_MAX_RATE_AGE_SECS", &secs)?);
        }

        cfg.validate()
    }

    pub fn validate(mut self) -> Result<Self> {
        self.home_country = self.home_country.trim().to_string();
        if self.home_country.is_empty() {
            return Err(UnderwritingError::ConfigError(
                "Home country must not be empty".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(UnderwritingError::ConfigError(
                "Fetch timeout must be positive".to_string(),
            ));
        }
        Ok(self)
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| UnderwritingError::ConfigError(format!("{key}: {e}")))
}
