use serde::Deserialize;
use serde_json::Value;

/// Inner event type that carries chat messages.
pub const MESSAGE_EVENT: &str = "message";

/// Outer payload type of an Events API callback.
pub const EVENT_CALLBACK: &str = "event_callback";

/// An event delivered by the messaging transport, tagged by its `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Sent once by the server after a connection is established.
    Hello,
    /// The server is about to close the connection.
    Disconnect {
        #[serde(default)]
        reason: Option<String>,
    },
    /// An Events API delivery. The payload is decoded lazily by the extractor.
    EventsApi { payload: Value },
    /// Slash commands, interactivity and anything else we don't handle.
    #[serde(other)]
    Unsupported,
}

impl InboundEvent {
    /// Create an Events API event around a raw payload.
    pub fn events_api(payload: Value) -> Self {
        InboundEvent::EventsApi { payload }
    }

    /// The `type` of the inner event, if this is an Events API delivery that has one.
    pub fn inner_event_type(&self) -> Option<&str> {
        match self {
            InboundEvent::EventsApi { payload } => payload
                .get("event")
                .and_then(|event| event.get("type"))
                .and_then(Value::as_str),
            _ => None,
        }
    }
}

/// A chat message as carried inside an `event_callback`.
///
/// Only the blocks are decoded; the rest of the event is not needed to find
/// a mention and its token.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub blocks: Option<Vec<Block>>,
}

impl MessageEvent {
    /// All segments of every rich text section, in message order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.blocks
            .iter()
            .flatten()
            .filter_map(|block| match block {
                Block::RichText { elements } => Some(elements),
                Block::Other => None,
            })
            .flatten()
            .filter_map(|element| match element {
                RichTextElement::RichTextSection { elements } => Some(elements),
                RichTextElement::Other => None,
            })
            .flatten()
    }
}

/// A layout block of a message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    RichText { elements: Vec<RichTextElement> },
    #[serde(other)]
    Other,
}

/// A top-level element of a rich text block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextElement {
    RichTextSection { elements: Vec<Segment> },
    /// Lists, quotes and preformatted runs are not scanned.
    #[serde(other)]
    Other,
}

/// A single run inside a rich text section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    User { user_id: String },
    #[serde(other)]
    Other,
}
