//! Turns one inbound event into at most one karma change.

use serde_json::Value;

use crate::error::ExtractError;
use crate::event::{InboundEvent, MessageEvent, Segment, EVENT_CALLBACK, MESSAGE_EVENT};
use crate::karma::Karma;

/// Extract a karma change from an inbound event.
///
/// Returns `Ok(None)` for anything that is not relevant: events other than
/// message deliveries, and messages without both a mention and a `++`/`--`
/// token. Returns an error when a message delivery does not have the shape
/// it claims to have.
pub fn extract(event: &InboundEvent) -> Result<Option<Karma>, ExtractError> {
    let InboundEvent::EventsApi { payload } = event else {
        return Ok(None);
    };

    if event.inner_event_type() != Some(MESSAGE_EVENT) {
        return Ok(None);
    }

    let message = decode_message(payload)?;

    let (mentioned_user, text) = scan(&message);
    let (Some(user_id), Some(text)) = (mentioned_user, text) else {
        return Ok(None);
    };

    if user_id.is_empty() || text.is_empty() {
        return Ok(None);
    }

    Ok(Karma::from_text(user_id, text))
}

/// Decode the inner event of an `event_callback` payload into a message.
fn decode_message(payload: &Value) -> Result<MessageEvent, ExtractError> {
    let found = payload.get("type").and_then(Value::as_str).unwrap_or_default();
    if found != EVENT_CALLBACK {
        return Err(ExtractError::UnexpectedPayload {
            found: found.to_string(),
        });
    }

    let inner = payload.get("event").cloned().unwrap_or_default();
    Ok(serde_json::from_value(inner)?)
}

/// Last mention and last trimmed text across the whole message.
fn scan(message: &MessageEvent) -> (Option<&str>, Option<&str>) {
    message
        .segments()
        .fold((None, None), |(user, text), segment| match segment {
            Segment::User { user_id } => (Some(user_id.as_str()), text),
            Segment::Text { text } => (user, Some(text.trim())),
            Segment::Other => (user, text),
        })
}
