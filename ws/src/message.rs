use crate::session::TopicId;
use serde::Serialize;
use serde_json::Value;

/// Trait for getting the WebSocket event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    // Bids (tender-scoped)
    #[serde(rename = "new_bid")]
    NewBid { bid: Value },
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self {
            Event::NewBid { .. } => "new_bid",
        }
    }
}

/// An event addressed to every session subscribed to `topic`.
#[derive(Debug, Clone)]
pub struct Message {
    pub event: Event,
    pub topic: TopicId,
}
