use std::{
    fs::File,
    io::BufReader,
    net::{IpAddr, Ipv4Addr},
    path::Path,
};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_USERNAME: &str = "GitHub PR Bot";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_address")]
    pub address: IpAddr,
    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Where to forward notifications. Without it, events are only logged to the terminal.
    #[serde(default)]
    pub discord: Option<DiscordConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Incoming webhook URL of the Discord channel
    pub webhook_url: Url,
    /// Name the messages are posted under
    #[serde(default = "default_username")]
    pub username: String,
    pub avatar_url: Option<Url>,
}

fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            discord: None,
        }
    }
}

impl DiscordConfig {
    pub fn new(webhook_url: Url) -> Self {
        Self {
            webhook_url,
            username: default_username(),
            avatar_url: None,
        }
    }
}

impl RelayConfig {
    /// Reads a YAML configuration file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("couldn't open {}", path.display()))?;
        serde_yaml::from_reader(BufReader::new(file)).context("couldn't parse config file")
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Overrides the Discord destination. An empty value counts as unset and leaves the
    /// configuration untouched.
    pub fn with_discord_webhook_url(mut self, raw: Option<&str>) -> anyhow::Result<Self> {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(self),
        };

        let webhook_url = Url::parse(raw).context("invalid Discord webhook URL")?;
        match self.discord.as_mut() {
            Some(discord) => discord.webhook_url = webhook_url,
            None => self.discord = Some(DiscordConfig::new(webhook_url)),
        }

        Ok(self)
    }
}
