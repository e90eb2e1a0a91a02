//! File-intent negotiation
//!
//! The owner's pending entry is claimed up front so two texts racing for the
//! same file cannot both process it. A failed attempt puts the entry back
//! unless it has expired, a newer file replaced it, or the file itself was
//! refused.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{Dispatcher, replies};
use crate::ai::mime::mime_for_path;
use crate::channels::line::text_messages;
use crate::channels::{Delivery, OutgoingMessage};
use crate::media::generate_file_name;
use crate::pending::{Lookup, PendingFile};
use crate::{Error, Result, intent};

impl Dispatcher {
    /// Treat `intent` as the instruction for the owner's pending file
    pub(super) async fn process_with_intent(
        &self,
        reply_token: &str,
        owner: &str,
        intent: &str,
    ) -> Result<()> {
        let entry = match self.pending.claim(owner, self.clock.now()) {
            Lookup::Missing => {
                self.reply_text(reply_token, replies::NO_PENDING_FILE).await?;
                return Ok(());
            }
            Lookup::Expired => {
                tracing::info!(owner, "pending file expired");
                self.reply_text(reply_token, replies::FILE_EXPIRED).await?;
                return Ok(());
            }
            Lookup::Pending(entry) => entry,
        };

        let ack = [OutgoingMessage::text(replies::PROCESSING)];
        match self.messenger.reply(reply_token, &ack).await {
            Ok(Delivery::Sent) => {}
            Ok(Delivery::TokenInvalid) => {
                self.pending.restore(entry, self.clock.now());
                tracing::warn!(owner, "reply token invalid, file processing skipped");
                return Ok(());
            }
            Err(e) => {
                self.pending.restore(entry, self.clock.now());
                return Err(e);
            }
        }

        tracing::info!(owner, media_ref = %entry.media_ref, kind = %entry.kind, "processing file");

        match self.process_file(&entry, intent).await {
            Ok(()) => {
                tracing::info!(owner, media_ref = %entry.media_ref, "file processed");
            }
            Err(e) => {
                let refused = e.is_unsupported_input();
                let restored = !refused && self.pending.restore(entry, self.clock.now());
                tracing::warn!(owner, error = %e, restored, "file processing failed");

                let notice = if refused {
                    replies::UNSUPPORTED_FILE
                } else {
                    replies::PROCESSING_FAILED
                };
                self.reply_or_push(reply_token, owner, notice).await;
            }
        }

        Ok(())
    }

    /// Fetch, store, generate and push the result
    async fn process_file(&self, entry: &PendingFile, intent: &str) -> Result<()> {
        let data = self.messenger.content(&entry.media_ref).await?;

        let size = u64::try_from(data.len()).unwrap_or(u64::MAX);
        if size > self.policy.max_file_size {
            return Err(Error::FileTooLarge {
                size,
                limit: self.policy.max_file_size,
            });
        }

        let file_name = generate_file_name(
            &format!("line_{}", entry.media_ref),
            entry.kind.extension(),
        );
        let path = self.media.save(&file_name, &data).await?;

        let generated = self.generate_for_file(&path, entry, intent).await;
        self.reaper.schedule(path);
        let answer = generated?;

        let messages = text_messages(&replies::file_result(&answer));
        self.messenger.push(&entry.owner_id, &messages).await
    }

    async fn generate_for_file(&self, path: &Path, entry: &PendingFile, intent: &str) -> Result<String> {
        let mime_type = mime_for_path(path);
        if !self.policy.allows(mime_type) {
            return Err(Error::UnsupportedMedia(mime_type.to_string()));
        }

        let data = self.media.read(path).await?;
        let encoded = STANDARD.encode(data);
        let prompt = intent::build_prompt(intent, entry.kind);

        tracing::debug!(
            media_ref = %entry.media_ref,
            mime_type,
            prompt_chars = prompt.chars().count(),
            "generating from file"
        );
        self.generator
            .generate_with_file(&prompt, &encoded, mime_type)
            .await
    }
}
