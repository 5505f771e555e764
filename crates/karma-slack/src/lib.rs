//! Karma Slack - Credentials, Web API client, and the Socket Mode transport.

pub mod api;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod socket;

pub use api::{AuthIdentity, SlackClient, DEFAULT_API_URL};
pub use credentials::{AppToken, BotToken};
pub use envelope::Envelope;
pub use error::{CredentialError, SlackError};
pub use socket::SocketModeClient;
