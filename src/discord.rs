use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::config::DiscordConfig;

/// Body of a Discord incoming webhook call.
#[derive(Debug, Serialize)]
pub struct DiscordMessage {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<Url>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    pub color: u32,
    pub author: EmbedAuthor,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Discord answered with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("couldn't reach Discord: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },
}

/// Something that can deliver an embed to a chat channel.
#[rocket::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, embed: Embed) -> Result<(), SendError>;
}

pub struct DiscordClient {
    client: Client,
    config: DiscordConfig,
}

impl DiscordClient {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Wraps a single embed in a message posted under the configured identity.
    pub fn message(&self, embed: Embed) -> DiscordMessage {
        DiscordMessage {
            username: self.config.username.clone(),
            avatar_url: self.config.avatar_url.clone(),
            embeds: vec![embed],
        }
    }
}

#[rocket::async_trait]
impl Notifier for DiscordClient {
    async fn send(&self, embed: Embed) -> Result<(), SendError> {
        let message = self.message(embed);
        trace!("posting to Discord: {:?}", message);

        let response = self
            .client
            .post(self.config.webhook_url.clone())
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            // Discord explains what went wrong in the body, that's worth having in the logs
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Status { status, body });
        }

        debug!("Discord answered with status {}", status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        task::JoinHandle,
    };

    use super::*;

    fn embed() -> Embed {
        Embed {
            title: "Pull Request #42 creado".to_string(),
            description: "Fix bug".to_string(),
            url: "http://x/42".to_string(),
            color: 5814783,
            author: EmbedAuthor {
                name: "alice".to_string(),
            },
        }
    }

    /// Reads a full HTTP/1.1 request, relying on `content-length` for the body.
    async fn read_request(socket: &mut TcpStream) -> (String, String) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some(end) = text.find("\r\n\r\n") {
                let head = text[..end].to_ascii_lowercase();
                let length = head
                    .lines()
                    .filter_map(|line| line.strip_prefix("content-length:"))
                    .find_map(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return (head, text[end + 4..].to_string());
                }
            }
        }

        panic!("connection closed before the request was complete");
    }

    /// Accepts a single request and answers it with `status`.
    async fn fake_discord(status: &'static str) -> (Url, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: 17\r\nconnection: close\r\n\r\n{{\"message\": \"no\"}}",
                status
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });

        let url = Url::parse(&format!("http://{}/api/webhooks/1/token", addr)).unwrap();
        (url, handle)
    }

    #[test]
    fn message_envelope() {
        let client = DiscordClient::new(DiscordConfig::new(
            Url::parse("https://discord.com/api/webhooks/1/token").unwrap(),
        ));

        let message = serde_json::to_value(client.message(embed())).unwrap();

        assert_eq!(
            message,
            json!({
                "username": "GitHub PR Bot",
                "embeds": [{
                    "title": "Pull Request #42 creado",
                    "description": "Fix bug",
                    "url": "http://x/42",
                    "color": 5814783,
                    "author": { "name": "alice" }
                }]
            })
        );
    }

    #[test]
    fn message_with_avatar() {
        let mut config =
            DiscordConfig::new(Url::parse("https://discord.com/api/webhooks/1/token").unwrap());
        config.avatar_url = Some(Url::parse("https://example.org/bot.png").unwrap());

        let message = serde_json::to_value(DiscordClient::new(config).message(embed())).unwrap();

        assert_eq!(message["avatar_url"], "https://example.org/bot.png");
    }

    #[tokio::test]
    async fn send_posts_json() {
        let (url, server) = fake_discord("200 OK").await;
        let client = DiscordClient::new(DiscordConfig::new(url));

        client.send(embed()).await.unwrap();

        let (head, body) = server.await.unwrap();
        assert!(head.starts_with("post /api/webhooks/1/token http/1.1"));
        assert!(head.contains("content-type: application/json"));

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["username"], "GitHub PR Bot");
        assert_eq!(body["embeds"][0]["title"], "Pull Request #42 creado");
        assert_eq!(body["embeds"][0]["color"], 5814783);
        assert_eq!(body["embeds"][0]["author"]["name"], "alice");
    }

    #[tokio::test]
    async fn error_status_fails() {
        let (url, server) = fake_discord("500 Internal Server Error").await;
        let client = DiscordClient::new(DiscordConfig::new(url));

        let err = client.send(embed()).await.unwrap_err();
        server.await.unwrap();

        match err {
            SendError::Status { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, r#"{"message": "no"}"#);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn client_error_status_fails() {
        let (url, server) = fake_discord("404 Not Found").await;
        let client = DiscordClient::new(DiscordConfig::new(url));

        let err = client.send(embed()).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, SendError::Status { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn unreachable_destination_fails() {
        // grab a free port, then stop listening on it
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/api/webhooks/1/token", addr)).unwrap();
        let client = DiscordClient::new(DiscordConfig::new(url));

        let err = client.send(embed()).await.unwrap_err();
        assert!(matches!(err, SendError::Http { .. }));
    }
}
