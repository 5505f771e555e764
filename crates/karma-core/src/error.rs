use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unexpected payload type '{found}' for a message event (expected 'event_callback')")]
    UnexpectedPayload { found: String },

    #[error("Failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Counter store unavailable: {0}")]
    Unavailable(String),

    #[error("Counter store command failed: {0}")]
    Command(String),
}
