//! Environment-driven configuration, loaded once at startup.

use std::env;
use std::time::Duration;

use eyre::{bail, Result};
use url::Url;

use crate::track::DEFAULT_MAX_MISSES;

/// Seconds between scan cycles unless overridden
const DEFAULT_POLL_SECS: u64 = 10;

/// Runtime configuration for the consumer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the arbitrage backend
    pub backend_url: Url,
    /// Interval between polling cycles
    pub poll_interval: Duration,
    /// Consecutive absent cycles before an opportunity is dropped
    pub max_misses: u32,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Environment Variables
    /// * `KITE_BACKEND_URL` - base URL of the backend (required)
    /// * `KITE_POLL_SECS` - seconds between scan cycles (default 10)
    /// * `KITE_MAX_MISSES` - eviction threshold (default 2, must be positive)
    ///
    /// # Errors
    /// * If `KITE_BACKEND_URL` is unset or not a valid URL
    /// * If `KITE_POLL_SECS` or `KITE_MAX_MISSES` are set but unparseable
    /// * If `KITE_MAX_MISSES` is zero
    pub fn from_env() -> Result<Self> {
        let backend_url = env::var("KITE_BACKEND_URL")
            .map_err(|_| eyre::eyre!("KITE_BACKEND_URL must be set"))?;
        let backend_url = Url::parse(&backend_url)?;

        let poll_secs = match env::var("KITE_POLL_SECS") {
            Ok(raw) => raw.parse::<u64>()?,
            Err(_) => DEFAULT_POLL_SECS,
        };

        let max_misses = match env::var("KITE_MAX_MISSES") {
            Ok(raw) => raw.parse::<u32>()?,
            Err(_) => DEFAULT_MAX_MISSES,
        };
        if max_misses == 0 {
            bail!("KITE_MAX_MISSES must be positive");
        }

        Ok(Self {
            backend_url,
            poll_interval: Duration::from_secs(poll_secs),
            max_misses,
        })
    }

    /// Absolute URL for a backend route such as `/arbitrage/calculate`
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
