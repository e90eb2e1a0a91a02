//! Messaging channel adapter
//!
//! The dispatcher talks to the platform through the [`Messenger`] trait so the
//! conversation logic can be exercised without a live LINE channel.

pub mod line;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use line::LineChannel;

use crate::Result;

/// Outcome of a reply-token send
///
/// Reply tokens are single use and expire quickly, so a rejected token is an
/// expected condition rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The platform accepted the messages
    Sent,
    /// The reply token was already used or has expired
    TokenInvalid,
}

/// Kind of media a user sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Photo
    Image,
    /// Video clip
    Video,
    /// Voice note or audio file
    Audio,
    /// Generic file (PDF, spreadsheet, ...)
    Document,
}

impl MediaKind {
    /// Extension used when saving the downloaded content
    ///
    /// The platform does not tell us the real format, so this is a guess per
    /// kind; documents are assumed to be PDF.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Image => ".jpg",
            Self::Video => ".mp4",
            Self::Audio => ".m4a",
            Self::Document => ".pdf",
        }
    }

    /// Localized label shown to the user
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Image => "รูปภาพ 🖼️",
            Self::Video => "วิดีโอ 🎥",
            Self::Audio => "ไฟล์เสียง 🎵",
            Self::Document => "เอกสาร 📄",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Document => write!(f, "document"),
        }
    }
}

/// Message envelope sent to the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage {
    /// Plain text message
    Text { text: String },
}

impl OutgoingMessage {
    /// Create a `text` message
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text content of the message
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Text { text } => text,
        }
    }
}

/// User profile as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub picture_url: Option<String>,
    pub status_message: Option<String>,
    pub language: Option<String>,
}

/// Outbound operations on the messaging platform
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Answer an inbound event through its reply token
    ///
    /// A consumed or expired token yields `Ok(Delivery::TokenInvalid)`.
    async fn reply(&self, reply_token: &str, messages: &[OutgoingMessage]) -> Result<Delivery>;

    /// Send messages to a conversation without a reply token
    async fn push(&self, to: &str, messages: &[OutgoingMessage]) -> Result<()>;

    /// Show the typing/loading animation in a chat
    async fn show_loading(&self, chat_id: &str) -> Result<()>;

    /// Download the binary content of a media message
    async fn content(&self, message_id: &str) -> Result<Vec<u8>>;

    /// Look up a user's profile
    async fn profile(&self, user_id: &str) -> Result<Profile>;
}
