//! Text message handling

use super::{Dispatcher, replies};
use crate::Result;
use crate::pending::Lookup;

impl Dispatcher {
    /// Answer a text message
    ///
    /// While a file is waiting for this owner (expired or not) the text is
    /// taken as the intent for that file.
    pub(super) async fn handle_text(&self, reply_token: &str, owner: &str, text: &str) -> Result<()> {
        if !matches!(self.pending.lookup(owner, self.clock.now()), Lookup::Missing) {
            return self.process_with_intent(reply_token, owner, text).await;
        }

        let lower = text.to_lowercase();
        if lower.contains("help") || lower.contains("ช่วย") {
            let name = match self.messenger.profile(owner).await {
                Ok(profile) => Some(profile.display_name),
                Err(e) => {
                    tracing::debug!(owner, error = %e, "profile lookup failed");
                    None
                }
            };
            self.reply_text(reply_token, &replies::help(name.as_deref()))
                .await?;
        } else if lower.contains("status") || lower.contains("สถานะ") {
            let now = self.clock.now();
            let uptime = (now - self.started_at).num_minutes();
            self.reply_text(reply_token, &replies::status(uptime, now))
                .await?;
        } else {
            self.chat(reply_token, owner, text).await?;
        }

        Ok(())
    }

    /// General conversation through the AI
    async fn chat(&self, reply_token: &str, owner: &str, text: &str) -> Result<()> {
        let prompt = replies::chat_prompt(text);
        match self.generator.generate_text(&prompt).await {
            Ok(answer) => {
                self.reply_text(reply_token, &answer).await?;
            }
            Err(e) => {
                tracing::warn!(owner, error = %e, "chat generation failed");
                self.reply_text(reply_token, replies::CHAT_FAILED).await?;
            }
        }
        Ok(())
    }
}
