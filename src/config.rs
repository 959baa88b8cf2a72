use std::time::Duration;

use serde::Deserialize;

/// Base URL of the TikWM downloader API.
pub const DEFAULT_PROVIDER_BASE: &str = "https://www.tikwm.com";

/// Path under the provider base that resolves a video link.
pub const PROVIDER_API_PATH: &str = "/api/";

/// Default bind address for the relay binary.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Upper bound on a single outbound provider call (15 s).
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;

pub const DEFAULT_USER_AGENT: &str = concat!("tikwm-relay/", env!("CARGO_PKG_VERSION"));

pub const MISSING_URL_MESSAGE: &str = "URL TikTok wajib diisi bre";
pub const INVALID_BODY_MESSAGE: &str = "Request body must be JSON";
pub const RELAY_FAILURE_MESSAGE: &str = "Gagal menghubungi server TikWM";

/// Top-level configuration for the relay service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: String,
    /// Provider base URL; the API path is appended to it.
    pub provider_base: String,
    /// Timeout for each outbound provider call, in seconds.
    pub upstream_timeout_secs: u64,
    /// User-Agent sent to the provider.
    pub user_agent: String,
}

impl RelayConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.max(1))
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            provider_base: DEFAULT_PROVIDER_BASE.to_string(),
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
