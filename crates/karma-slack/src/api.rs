use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::credentials::{AppToken, BotToken};
use crate::error::SlackError;

pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Identity of the bot as reported by `auth.test`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthIdentity {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConnectionsOpen {
    url: String,
}

/// Minimal Slack Web API client.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_url: String,
    app_token: AppToken,
    bot_token: BotToken,
}

impl SlackClient {
    pub fn new(api_url: impl Into<String>, app_token: AppToken, bot_token: BotToken) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            app_token,
            bot_token,
        }
    }

    /// Verify the bot token and return who we are.
    pub async fn auth_test(&self) -> Result<AuthIdentity, SlackError> {
        self.call("auth.test", self.bot_token.expose()).await
    }

    /// Request a Socket Mode WebSocket URL.
    pub async fn open_connection(&self) -> Result<String, SlackError> {
        let open: ConnectionsOpen = self
            .call("apps.connections.open", self.app_token.expose())
            .await?;
        Ok(open.url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        token: &str,
    ) -> Result<T, SlackError> {
        let url = format!("{}/{}", self.api_url.trim_end_matches('/'), method);
        tracing::debug!(method, "Calling Slack API");

        let body = self
            .http
            .post(&url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let status: ApiStatus = serde_json::from_slice(&body)?;
        if !status.ok {
            return Err(SlackError::Api {
                method,
                error: status.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
