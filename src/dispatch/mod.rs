//! Webhook event dispatch
//!
//! Takes a parsed webhook batch and drives each event through text chat, file
//! intake or the file-intent negotiation. Nothing in here fails outward: every
//! error ends in a log line or a best-effort message to the user.

mod file;
mod negotiate;
pub mod replies;
mod text;

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::ai::Generator;
use crate::channels::line::{EventDedup, EventMessage, WebhookBody, WebhookEvent, text_messages};
use crate::channels::{Delivery, Messenger, OutgoingMessage};
use crate::clock::{Clock, SystemClock};
use crate::config::MediaPolicy;
use crate::media::{MediaStore, TempFileReaper};
use crate::pending::PendingFileStore;
use crate::Result;

/// Routes webhook events to their handlers
pub struct Dispatcher {
    messenger: Arc<dyn Messenger>,
    generator: Arc<dyn Generator>,
    pending: PendingFileStore,
    dedup: Mutex<EventDedup>,
    media: MediaStore,
    reaper: TempFileReaper,
    policy: MediaPolicy,
    clock: Arc<dyn Clock>,
    started_at: DateTime<Utc>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.pending.len())
            .field("media", &self.media)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher using the system clock
    #[must_use]
    pub fn new(
        messenger: Arc<dyn Messenger>,
        generator: Arc<dyn Generator>,
        media: MediaStore,
        reaper: TempFileReaper,
        policy: MediaPolicy,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let started_at = clock.now();
        Self {
            messenger,
            generator,
            pending: PendingFileStore::new(),
            dedup: Mutex::new(EventDedup::default()),
            media,
            reaper,
            policy,
            clock,
            started_at,
        }
    }

    /// Replace the clock (uptime restarts from the new clock's now)
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.started_at = clock.now();
        self.clock = clock;
        self
    }

    /// Files waiting for an intent
    #[must_use]
    pub const fn pending(&self) -> &PendingFileStore {
        &self.pending
    }

    /// Temporary file reaper used after processing
    #[must_use]
    pub const fn reaper(&self) -> &TempFileReaper {
        &self.reaper
    }

    /// Process a webhook batch, one event at a time
    pub async fn handle(&self, body: WebhookBody) {
        tracing::debug!(events = body.events.len(), "dispatching webhook batch");
        for event in body.events {
            self.handle_event(event).await;
        }
    }

    /// Process a single event
    pub async fn handle_event(&self, event: WebhookEvent) {
        if event.is_redelivery() {
            tracing::debug!(event_id = ?event.webhook_event_id, "skipping redelivered event");
            return;
        }

        if let Some(event_id) = event.webhook_event_id.as_deref()
            && self.is_duplicate(event_id)
        {
            tracing::debug!(event_id, "skipping duplicate event");
            return;
        }

        if event.event_type != "message" {
            tracing::debug!(event_type = %event.event_type, "skipping non-message event");
            return;
        }

        let Some(message) = event.message.as_ref() else {
            return;
        };
        let Some(owner) = event.owner_id() else {
            tracing::warn!("message event without a source identity");
            return;
        };
        let Some(reply_token) = event.reply_token.as_deref() else {
            tracing::warn!(owner, "message event without a reply token");
            return;
        };

        tracing::info!(owner, kind = message.kind_name(), "processing message event");

        if let Err(e) = self.messenger.show_loading(owner).await {
            tracing::debug!(owner, error = %e, "loading indicator failed");
        }

        let result = match (message, message.media()) {
            (EventMessage::Text { text, .. }, _) => self.handle_text(reply_token, owner, text).await,
            (_, Some((kind, media_ref))) => {
                self.handle_file(reply_token, owner, kind, media_ref).await
            }
            (_, None) => self
                .reply_text(reply_token, replies::UNSUPPORTED_MESSAGE)
                .await
                .map(drop),
        };

        if let Err(e) = result {
            tracing::error!(owner, error = %e, "event handling failed");
            if let Err(e) = self.reply_text(reply_token, replies::GENERIC_ERROR).await {
                tracing::warn!(owner, error = %e, "error reply failed");
            }
        }
    }

    fn is_duplicate(&self, event_id: &str) -> bool {
        self.dedup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_duplicate(event_id)
    }

    /// Reply with one text, split to fit the platform limits
    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<Delivery> {
        let delivery = self
            .messenger
            .reply(reply_token, &text_messages(text))
            .await?;
        if delivery == Delivery::TokenInvalid {
            tracing::warn!("reply token invalid, message dropped");
        }
        Ok(delivery)
    }

    /// Reply, falling back to push when the token is no longer usable
    async fn reply_or_push(&self, reply_token: &str, owner: &str, text: &str) {
        let messages: Vec<OutgoingMessage> = text_messages(text);
        match self.messenger.reply(reply_token, &messages).await {
            Ok(Delivery::Sent) => return,
            Ok(Delivery::TokenInvalid) => {
                tracing::debug!(owner, "reply token consumed, pushing instead");
            }
            Err(e) => tracing::warn!(owner, error = %e, "reply failed, pushing instead"),
        }
        if let Err(e) = self.messenger.push(owner, &messages).await {
            tracing::error!(owner, error = %e, "push fallback failed");
        }
    }
}
