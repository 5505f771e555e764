use crate::error::CredentialError;

const APP_TOKEN_PREFIX: &str = "xapp-";
const BOT_TOKEN_PREFIX: &str = "xoxb-";

/// App-level token, used to open Socket Mode connections.
#[derive(Clone, PartialEq)]
pub struct AppToken(String);

/// Bot token, used for Web API calls on behalf of the bot user.
#[derive(Clone, PartialEq)]
pub struct BotToken(String);

impl AppToken {
    pub fn parse(token: &str) -> Result<Self, CredentialError> {
        if token.is_empty() {
            return Err(CredentialError::MissingAppToken);
        }
        if !token.starts_with(APP_TOKEN_PREFIX) {
            return Err(CredentialError::InvalidAppToken);
        }
        Ok(Self(token.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl BotToken {
    pub fn parse(token: &str) -> Result<Self, CredentialError> {
        if token.is_empty() {
            return Err(CredentialError::MissingBotToken);
        }
        if !token.starts_with(BOT_TOKEN_PREFIX) {
            return Err(CredentialError::InvalidBotToken);
        }
        Ok(Self(token.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AppToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AppToken({}***)", APP_TOKEN_PREFIX)
    }
}

impl std::fmt::Debug for BotToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BotToken({}***)", BOT_TOKEN_PREFIX)
    }
}
