//! Raw LINE Messaging API calls

use reqwest::StatusCode;
use secrecy::ExposeSecret;

use super::types::{LOADING_SECONDS, LoadingRequest, PushRequest, ReplyRequest};
use crate::channels::{Delivery, OutgoingMessage, Profile};
use crate::{Error, Result};

/// Whether a failed reply was rejected because the token was used or expired
///
/// The platform answers 400 with "Invalid reply token" in that case.
#[must_use]
pub fn is_invalid_reply_token(status: u16, body: &str) -> bool {
    status == 400 && body.to_lowercase().contains("invalid reply token")
}

impl super::LineChannel {
    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }

    /// Answer an event through its reply token
    ///
    /// # Errors
    ///
    /// Returns error if the request fails for any reason other than an
    /// invalid reply token
    pub async fn reply_message(
        &self,
        reply_token: &str,
        messages: &[OutgoingMessage],
    ) -> Result<Delivery> {
        let url = format!("{}/message/reply", self.api_base);
        let request = ReplyRequest {
            reply_token,
            messages,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("LINE reply error: {e}")))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(messages = messages.len(), "LINE reply sent");
            return Ok(Delivery::Sent);
        }

        let body = response.text().await.unwrap_or_default();
        if is_invalid_reply_token(status.as_u16(), &body) {
            tracing::debug!("LINE reply token rejected");
            return Ok(Delivery::TokenInvalid);
        }

        Err(Error::Channel(format!("LINE reply error: {status} - {body}")))
    }

    /// Push messages to a user, group or room
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn push_message(&self, to: &str, messages: &[OutgoingMessage]) -> Result<()> {
        let url = format!("{}/message/push", self.api_base);
        let request = PushRequest { to, messages };

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("LINE push error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!("LINE push error: {status} - {body}")));
        }

        tracing::debug!(to, messages = messages.len(), "LINE push sent");
        Ok(())
    }

    /// Start the loading animation in a one-on-one chat
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn start_loading(&self, chat_id: &str) -> Result<()> {
        let url = format!("{}/chat/loading/start", self.api_base);
        let request = LoadingRequest {
            chat_id,
            loading_seconds: LOADING_SECONDS,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("LINE loading error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!("LINE loading error: {status} - {body}")));
        }

        Ok(())
    }

    /// Download the binary content of a media message
    ///
    /// # Errors
    ///
    /// Returns error if the download fails or the content is not ready yet
    pub async fn message_content(&self, message_id: &str) -> Result<Vec<u8>> {
        let url = format!("{}/message/{message_id}/content", self.data_api_base);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| Error::Channel(format!("LINE content error: {e}")))?;

        let status = response.status();
        if status == StatusCode::ACCEPTED {
            return Err(Error::Channel(format!(
                "LINE content for message {message_id} is still being prepared"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!("LINE content error: {status} - {body}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Channel(format!("LINE content read error: {e}")))?;

        tracing::debug!(message_id, size = bytes.len(), "LINE content downloaded");
        Ok(bytes.to_vec())
    }

    /// Look up a user's profile
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is malformed
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        let url = format!("{}/profile/{user_id}", self.api_base);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| Error::Channel(format!("LINE profile error: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Channel(format!("LINE profile read error: {e}")))?;

        if !status.is_success() {
            return Err(Error::Channel(format!("LINE profile error: {status} - {body}")));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Channel(format!("LINE profile parse error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_reply_token_detection() {
        assert!(is_invalid_reply_token(400, r#"{"message":"Invalid reply token"}"#));
        assert!(is_invalid_reply_token(400, "invalid reply token"));
        assert!(!is_invalid_reply_token(400, r#"{"message":"The request body has 1 error(s)"}"#));
        assert!(!is_invalid_reply_token(500, "Invalid reply token"));
    }
}
