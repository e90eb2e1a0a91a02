//! LINE webhook payload types

use serde::{Deserialize, Serialize};

use crate::channels::MediaKind;

/// Webhook request body
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WebhookBody {
    /// Bot user ID the events are addressed to
    #[serde(default)]
    pub destination: Option<String>,

    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// Envelope read before the events are typed one by one
#[derive(Deserialize)]
struct RawWebhookBody {
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    events: Vec<serde_json::Value>,
}

impl WebhookBody {
    /// Parse a delivery, skipping events that do not deserialize
    ///
    /// Only a body that is not a JSON object with an `events` array is an
    /// error; one malformed event never costs the rest of the batch.
    ///
    /// # Errors
    ///
    /// Returns error if the envelope itself is malformed
    pub fn parse(body: &[u8]) -> serde_json::Result<Self> {
        let raw: RawWebhookBody = serde_json::from_slice(body)?;
        let events = raw
            .events
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed webhook event");
                    None
                }
            })
            .collect();

        Ok(Self {
            destination: raw.destination,
            events,
        })
    }
}

/// A single webhook event (simplified)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// Event type ("message", "follow", "postback", ...)
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unique event ID, stable across redeliveries
    #[serde(default)]
    pub webhook_event_id: Option<String>,

    #[serde(default)]
    pub delivery_context: DeliveryContext,

    /// Single-use token for answering this event
    #[serde(default)]
    pub reply_token: Option<String>,

    #[serde(default)]
    pub source: Option<EventSource>,

    #[serde(default)]
    pub message: Option<EventMessage>,

    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl WebhookEvent {
    /// Whether the platform flagged this event as a redelivery
    #[must_use]
    pub const fn is_redelivery(&self) -> bool {
        self.delivery_context.is_redelivery
    }

    /// Conversation identity the event belongs to
    #[must_use]
    pub fn owner_id(&self) -> Option<&str> {
        self.source.as_ref().and_then(EventSource::owner_id)
    }
}

/// Delivery metadata
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    #[serde(default)]
    pub is_redelivery: bool,
}

/// Where the event came from
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    /// "user", "group" or "room"
    #[serde(rename = "type")]
    pub source_type: String,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}

impl EventSource {
    /// Sender identity, falling back to the group or room for anonymous senders
    #[must_use]
    pub fn owner_id(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .or(self.group_id.as_deref())
            .or(self.room_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Message payload, tagged by message type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventMessage {
    Text {
        id: String,
        text: String,
    },
    Image {
        id: String,
    },
    Video {
        id: String,
    },
    Audio {
        id: String,
    },
    File {
        id: String,
        #[serde(rename = "fileName", default)]
        file_name: Option<String>,
        #[serde(rename = "fileSize", default)]
        file_size: Option<u64>,
    },
    /// Sticker, location and any type added later
    #[serde(other)]
    Unsupported,
}

impl EventMessage {
    /// Media kind and content reference for file-like messages
    #[must_use]
    pub fn media(&self) -> Option<(MediaKind, &str)> {
        match self {
            Self::Image { id } => Some((MediaKind::Image, id)),
            Self::Video { id } => Some((MediaKind::Video, id)),
            Self::Audio { id } => Some((MediaKind::Audio, id)),
            Self::File { id, .. } => Some((MediaKind::Document, id)),
            Self::Text { .. } | Self::Unsupported => None,
        }
    }

    /// Short type name for logging
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Audio { .. } => "audio",
            Self::File { .. } => "file",
            Self::Unsupported => "unsupported",
        }
    }
}
