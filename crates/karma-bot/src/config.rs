use karma_slack::{AppToken, BotToken, CredentialError, DEFAULT_API_URL};

/// Bot configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_token: AppToken,
    pub bot_token: BotToken,
    pub api_url: String,
    pub redis_url: String,
    pub flush_on_start: bool,
    pub event_buffer: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_token = AppToken::parse(&var("SLACK_APP_TOKEN").unwrap_or_default())
            .map_err(|e| ConfigError::Credential("SLACK_APP_TOKEN", e))?;

        let bot_token = BotToken::parse(&var("SLACK_BOT_TOKEN").unwrap_or_default())
            .map_err(|e| ConfigError::Credential("SLACK_BOT_TOKEN", e))?;

        let api_url = var("SLACK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let redis_url =
            var("KARMA_REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379".to_string());

        let flush_on_start = match var("KARMA_FLUSH_ON_START").as_deref() {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(_) => {
                return Err(ConfigError::Invalid(
                    "KARMA_FLUSH_ON_START",
                    "must be true, false, 1 or 0",
                ))
            }
        };

        let event_buffer = match var("KARMA_EVENT_BUFFER") {
            Some(s) => s
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid(
                    "KARMA_EVENT_BUFFER",
                    "must be a positive integer",
                ))?,
            None => 64,
        };

        Ok(Config {
            app_token,
            bot_token,
            api_url,
            redis_url,
            flush_on_start,
            event_buffer,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Credential(&'static str, CredentialError),
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Credential(var, e) => write!(f, "{} ({})", e, var),
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}
