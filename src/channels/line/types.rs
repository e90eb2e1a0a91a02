//! LINE Messaging API request types

use serde::Serialize;

use crate::channels::OutgoingMessage;

/// Seconds the loading animation stays up (multiple of 5, at most 60)
pub const LOADING_SECONDS: u32 = 20;

/// `POST /message/reply`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest<'a> {
    pub reply_token: &'a str,
    pub messages: &'a [OutgoingMessage],
}

/// `POST /message/push`
#[derive(Debug, Serialize)]
pub struct PushRequest<'a> {
    pub to: &'a str,
    pub messages: &'a [OutgoingMessage],
}

/// `POST /chat/loading/start`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingRequest<'a> {
    pub chat_id: &'a str,
    pub loading_seconds: u32,
}
