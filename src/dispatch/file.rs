//! File message intake

use super::{Dispatcher, replies};
use crate::Result;
use crate::channels::MediaKind;
use crate::pending::PendingFile;

impl Dispatcher {
    /// Record a received file and ask the user what to do with it
    ///
    /// The content is not downloaded here.
    pub(super) async fn handle_file(
        &self,
        reply_token: &str,
        owner: &str,
        kind: MediaKind,
        media_ref: &str,
    ) -> Result<()> {
        let entry = PendingFile::new(owner, media_ref, kind, self.clock.now());
        if let Some(previous) = self.pending.insert(entry) {
            tracing::debug!(owner, replaced = %previous.media_ref, "pending file replaced");
        }
        tracing::info!(owner, media_ref, %kind, "file awaiting intent");

        if let Err(e) = self.reply_text(reply_token, &replies::file_menu(kind)).await {
            // The user was never asked, so their next text must not become an intent
            let dropped = self.pending.remove_if_current(owner, media_ref);
            tracing::warn!(owner, error = %e, dropped, "file menu reply failed");
            if let Err(e) = self
                .reply_text(reply_token, replies::FILE_RECEIVE_FAILED)
                .await
            {
                tracing::warn!(owner, error = %e, "file receive notice failed");
            }
        }

        Ok(())
    }
}
