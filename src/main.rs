use anyhow::Result;
use clap::Parser;

use tikwm_relay::api::{relay_api, simple};
use tikwm_relay::config::{
    RelayConfig, DEFAULT_BIND_ADDR, DEFAULT_PROVIDER_BASE, DEFAULT_UPSTREAM_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};

/// Relay TikTok links to the TikWM downloader API.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, env = "RELAY_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Provider base URL
    #[arg(long, env = "TIKWM_BASE_URL", default_value = DEFAULT_PROVIDER_BASE)]
    provider_base: String,

    /// Outbound request timeout in seconds
    #[arg(short, long, env = "RELAY_TIMEOUT_SECS", default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
    timeout: u64,

    /// User-Agent sent to the provider
    #[arg(long, env = "RELAY_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

impl From<Cli> for RelayConfig {
    fn from(cli: Cli) -> Self {
        Self {
            bind_addr: cli.bind,
            provider_base: cli.provider_base,
            upstream_timeout_secs: cli.timeout,
            user_agent: cli.user_agent,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    simple::init_tracing();
    let config = RelayConfig::from(Cli::parse());
    relay_api::run(config).await
}
