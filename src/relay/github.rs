use crate::{
    discord::{Embed, EmbedAuthor},
    webhooks::github::PullRequestEvent,
};

const SEPARATOR: &str = "⋅";

/// Pull request actions worth announcing. Everything else GitHub sends (closed, labeled,
/// assigned, ...) is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrAction {
    Opened,
    Reopened,
    Synchronize,
}

impl PrAction {
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "opened" => Some(Self::Opened),
            "reopened" => Some(Self::Reopened),
            "synchronize" => Some(Self::Synchronize),
            _ => None,
        }
    }

    /// Word used in the Discord embed title.
    pub fn label(self) -> &'static str {
        match self {
            Self::Opened => "creado",
            Self::Reopened => "reabierto",
            Self::Synchronize => "actualizado",
        }
    }

    pub fn color(self) -> u32 {
        match self {
            // blue
            Self::Opened => 5814783,
            // orange
            Self::Reopened => 16750899,
            // green
            Self::Synchronize => 5763719,
        }
    }
}

/// One-line summary printed in the terminal for every announced event.
pub fn terminal_notice(event: &PullRequestEvent) -> String {
    format!(
        "[{}] PR #{}: {} {} {}",
        event.repository.full_name,
        event.number,
        event.pull_request,
        SEPARATOR,
        event.pull_request.html_url
    )
}

pub fn embed(action: PrAction, event: &PullRequestEvent) -> Embed {
    let pr = &event.pull_request;

    Embed {
        title: format!("Pull Request #{} {}", event.number, action.label()),
        description: pr.title.clone(),
        url: pr.html_url.clone(),
        color: action.color(),
        author: EmbedAuthor {
            name: pr.user.login.clone(),
        },
    }
}
