use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::{
    config::RelayConfig,
    discord::{DiscordClient, Notifier, SendError},
    webhooks::github::PullRequestEvent,
};

mod github;
use github::{embed, terminal_notice, PrAction};

pub(crate) mod utils;
use utils::shorten_content;

/// Process-wide state shared by every request. Built once at startup and never mutated.
pub struct Relay {
    notifier: Option<Arc<dyn Notifier>>,
}

impl Relay {
    pub fn new(notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self { notifier }
    }

    /// Builds a [`Relay`] forwarding to Discord if the configuration has a webhook URL.
    pub fn from_config(config: &RelayConfig) -> Self {
        let notifier = config
            .discord
            .clone()
            .map(|discord| Arc::new(DiscordClient::new(discord)) as Arc<dyn Notifier>);

        if notifier.is_none() {
            warn!(
                "no Discord webhook URL configured, notifications will only show up in the terminal"
            );
        }

        Self::new(notifier)
    }

    pub fn is_forwarding(&self) -> bool {
        self.notifier.is_some()
    }

    /// Announces the event in the terminal and forwards it, if its action is worth it.
    ///
    /// Only a failed forward is reported as an error, a missing destination is just a warning.
    pub async fn handle_pull_request(&self, event: PullRequestEvent) -> Result<(), SendError> {
        let action = match PrAction::from_action(&event.action) {
            Some(action) => action,
            None => {
                trace!("action `{}` didn't need to be announced", event.action);
                return Ok(());
            }
        };

        info!("{}", terminal_notice(&event));
        if let Some(body) = event.pull_request.body.as_deref().filter(|b| !b.is_empty()) {
            debug!("PR #{} description: {}", event.number, shorten_content(body));
        }

        let notifier = match &self.notifier {
            Some(notifier) => notifier,
            None => {
                warn!(
                    "not forwarding PR #{} to Discord: no webhook URL configured",
                    event.number
                );
                return Ok(());
            }
        };

        notifier.send(embed(action, &event)).await?;
        info!("notification for PR #{} sent to Discord", event.number);

        Ok(())
    }
}
