use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
use config::RelayConfig;

mod discord;

mod relay;
use relay::Relay;

mod webhooks;
use webhooks::WEBHOOK_PATH;

#[derive(Parser)]
#[command(version)]
struct Opts {
    /// Optional YAML configuration file for prhook
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Discord incoming webhook URL. Without it, notifications are only printed in the terminal.
    #[arg(long, env = "DISCORD_WEBHOOK_URL")]
    discord_webhook_url: Option<String>,
}

impl Opts {
    fn resolve_config(&self) -> anyhow::Result<RelayConfig> {
        let config = match &self.config {
            Some(path) => RelayConfig::from_file(path)?,
            None => RelayConfig::default(),
        };

        config
            .with_port(self.port)
            .with_discord_webhook_url(self.discord_webhook_url.as_deref())
    }
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::parse();
    let config = opts.resolve_config().context("couldn't load configuration")?;

    let relay = Relay::from_config(&config);

    info!(
        "listening for GitHub webhooks on {}:{}{}",
        config.address, config.port, WEBHOOK_PATH
    );

    let figment = rocket::Config::figment()
        .merge(("address", config.address))
        .merge(("port", config.port));

    webhooks::server(figment, relay)
        .launch()
        .await
        .map(|_| ())
        .map_err(|err| anyhow::anyhow!(err))
}
