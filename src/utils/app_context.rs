//! Application context shared by every backend-facing operation.

use std::time::Duration;

use eyre::Result;
use reqwest::Client;

use crate::config::Config;

/// How long to wait for the backend to accept a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared context: configuration plus one reused HTTP client.
///
/// The client carries only a connect timeout. A whole-request timeout would
/// cut off the streaming calculate endpoint, whose response body stays open
/// for the duration of the backend's scan.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Runtime configuration loaded from the environment
    pub config: Config,
    /// HTTP client reused across all requests
    pub http: Client,
}

impl AppContext {
    /// Creates the context from the environment.
    ///
    /// # Errors
    /// * If configuration is missing or invalid
    /// * If the HTTP client fails to build
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self { config, http })
    }
}
