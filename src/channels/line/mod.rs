//! LINE channel adapter
//!
//! Receives events through the webhook route and talks back through the
//! Messaging API.

mod api;
pub mod chunking;
pub mod dedup;
pub mod events;
pub mod signature;
pub mod types;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use super::{Delivery, Messenger, OutgoingMessage, Profile};
use crate::config::LineConfig;
use crate::{Error, Result};

pub use api::is_invalid_reply_token;
pub use chunking::text_messages;
pub use dedup::EventDedup;
pub use events::{EventMessage, EventSource, WebhookBody, WebhookEvent};

/// LINE channel adapter
#[derive(Clone)]
pub struct LineChannel {
    client: Client,
    access_token: SecretString,
    api_base: String,
    data_api_base: String,
}

impl std::fmt::Debug for LineChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineChannel")
            .field("api_base", &self.api_base)
            .field("data_api_base", &self.data_api_base)
            .finish_non_exhaustive()
    }
}

impl LineChannel {
    /// Create a new LINE channel adapter
    ///
    /// # Errors
    ///
    /// Returns error if the channel access token is empty
    pub fn new(config: &LineConfig) -> Result<Self> {
        if config.channel_access_token.expose_secret().is_empty() {
            return Err(Error::Config("LINE channel access token required".to_string()));
        }

        Ok(Self {
            client: Client::new(),
            access_token: config.channel_access_token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            data_api_base: config.data_api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Messenger for LineChannel {
    async fn reply(&self, reply_token: &str, messages: &[OutgoingMessage]) -> Result<Delivery> {
        self.reply_message(reply_token, messages).await
    }

    async fn push(&self, to: &str, messages: &[OutgoingMessage]) -> Result<()> {
        self.push_message(to, messages).await
    }

    async fn show_loading(&self, chat_id: &str) -> Result<()> {
        self.start_loading(chat_id).await
    }

    async fn content(&self, message_id: &str) -> Result<Vec<u8>> {
        self.message_content(message_id).await
    }

    async fn profile(&self, user_id: &str) -> Result<Profile> {
        self.get_profile(user_id).await
    }
}
