use serde::Deserialize;

use karma_core::InboundEvent;

#[derive(Deserialize)]
struct EnvelopeId {
    #[serde(default)]
    envelope_id: Option<String>,
}

/// One Socket Mode frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    /// Present on every frame Slack expects to be acknowledged.
    #[serde(default)]
    pub envelope_id: Option<String>,
    #[serde(flatten)]
    pub event: InboundEvent,
}

impl Envelope {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The acknowledgement frame for this envelope, if it needs one.
    pub fn ack(&self) -> Option<String> {
        self.envelope_id.as_deref().map(ack_frame)
    }

    /// The acknowledgement for a raw frame that could not be decoded as an
    /// envelope but still names one.
    pub fn ack_raw(text: &str) -> Option<String> {
        serde_json::from_str::<EnvelopeId>(text)
            .ok()
            .and_then(|frame| frame.envelope_id)
            .map(|id| ack_frame(&id))
    }
}

fn ack_frame(envelope_id: &str) -> String {
    serde_json::json!({ "envelope_id": envelope_id }).to_string()
}
