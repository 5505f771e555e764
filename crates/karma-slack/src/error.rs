use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CredentialError {
    #[error("The Slack app token was not provided")]
    MissingAppToken,

    #[error("The provided Slack app token was not valid (expected prefix 'xapp-')")]
    InvalidAppToken,

    #[error("The Slack bot token was not provided")]
    MissingBotToken,

    #[error("The provided Slack bot token was not valid (expected prefix 'xoxb-')")]
    InvalidBotToken,
}

#[derive(Error, Debug)]
pub enum SlackError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Slack API call {method} failed: {error}")]
    Api { method: &'static str, error: String },

    #[error("Failed to decode Slack response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
