//! Shared test utilities

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use line_gemini_gateway::channels::line::WebhookEvent;
use line_gemini_gateway::config::MediaPolicy;
use line_gemini_gateway::media::{MediaStore, TempFileReaper};
use line_gemini_gateway::{
    Clock, Delivery, Dispatcher, Error, Generator, Messenger, OutgoingMessage, Profile, Result,
};
use tempfile::TempDir;

/// Something the dispatcher asked the platform to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Reply { token: String, texts: Vec<String> },
    Push { to: String, texts: Vec<String> },
    Loading { chat_id: String },
    Content { message_id: String },
    Profile { user_id: String },
}

/// In-memory messenger recording every call
///
/// Reply tokens are single use: a token answers once, then reports
/// `TokenInvalid`, like the real platform.
#[derive(Default)]
pub struct RecordingMessenger {
    calls: Mutex<Vec<Call>>,
    used_tokens: Mutex<HashSet<String>>,
    content: Mutex<HashMap<String, Vec<u8>>>,
    fail_content: Mutex<bool>,
    failing_tokens: Mutex<HashSet<String>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Mark a token as already consumed
    pub fn invalidate_token(&self, token: &str) {
        self.used_tokens.lock().unwrap().insert(token.to_string());
    }

    /// Make every reply on `token` fail with a transport error
    pub fn fail_replies_on(&self, token: &str) {
        self.failing_tokens
            .lock()
            .unwrap()
            .insert(token.to_string());
    }

    pub fn set_content(&self, message_id: &str, data: &[u8]) {
        self.content
            .lock()
            .unwrap()
            .insert(message_id.to_string(), data.to_vec());
    }

    pub fn fail_content(&self, fail: bool) {
        *self.fail_content.lock().unwrap() = fail;
    }

    pub fn replies(&self) -> Vec<(String, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Reply { token, texts } => Some((token, texts)),
                _ => None,
            })
            .collect()
    }

    pub fn pushes(&self) -> Vec<(String, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Push { to, texts } => Some((to, texts)),
                _ => None,
            })
            .collect()
    }

    pub fn content_fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Content { .. }))
            .count()
    }

    /// Whether anything besides the loading indicator was sent
    pub fn has_side_effects(&self) -> bool {
        !self.calls().is_empty()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn texts(messages: &[OutgoingMessage]) -> Vec<String> {
    messages.iter().map(|m| m.content().to_string()).collect()
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn reply(&self, reply_token: &str, messages: &[OutgoingMessage]) -> Result<Delivery> {
        if self.failing_tokens.lock().unwrap().contains(reply_token) {
            return Err(Error::Channel("reply rejected: 500".to_string()));
        }
        if !self.used_tokens.lock().unwrap().insert(reply_token.to_string()) {
            return Ok(Delivery::TokenInvalid);
        }
        self.record(Call::Reply {
            token: reply_token.to_string(),
            texts: texts(messages),
        });
        Ok(Delivery::Sent)
    }

    async fn push(&self, to: &str, messages: &[OutgoingMessage]) -> Result<()> {
        self.record(Call::Push {
            to: to.to_string(),
            texts: texts(messages),
        });
        Ok(())
    }

    async fn show_loading(&self, chat_id: &str) -> Result<()> {
        self.record(Call::Loading {
            chat_id: chat_id.to_string(),
        });
        Ok(())
    }

    async fn content(&self, message_id: &str) -> Result<Vec<u8>> {
        self.record(Call::Content {
            message_id: message_id.to_string(),
        });
        if *self.fail_content.lock().unwrap() {
            return Err(Error::Channel("content unavailable".to_string()));
        }
        Ok(self
            .content
            .lock()
            .unwrap()
            .get(message_id)
            .cloned()
            .unwrap_or_else(|| b"fake-binary".to_vec()))
    }

    async fn profile(&self, user_id: &str) -> Result<Profile> {
        self.record(Call::Profile {
            user_id: user_id.to_string(),
        });
        Ok(Profile {
            user_id: user_id.to_string(),
            display_name: "Tester".to_string(),
            picture_url: None,
            status_message: None,
            language: Some("th".to_string()),
        })
    }
}

/// A generation request seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationCall {
    pub prompt: String,
    pub mime_type: Option<String>,
    pub data_base64: Option<String>,
}

/// Scripted generator
#[derive(Default)]
pub struct MockGenerator {
    calls: Mutex<Vec<GenerationCall>>,
    fail: Mutex<bool>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn file_calls(&self) -> Vec<GenerationCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.mime_type.is_some())
            .collect()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn respond(&self, call: GenerationCall) -> Result<String> {
        self.calls.lock().unwrap().push(call);
        if *self.fail.lock().unwrap() {
            return Err(Error::Generation("scripted failure".to_string()));
        }
        Ok("AI answer".to_string())
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.respond(GenerationCall {
            prompt: prompt.to_string(),
            mime_type: None,
            data_base64: None,
        })
    }

    async fn generate_with_file(
        &self,
        prompt: &str,
        data_base64: &str,
        mime_type: &str,
    ) -> Result<String> {
        self.respond(GenerationCall {
            prompt: prompt.to_string(),
            mime_type: Some(mime_type.to_string()),
            data_base64: Some(data_base64.to_string()),
        })
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Dispatcher wired to mocks and a temporary upload directory
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub messenger: Arc<RecordingMessenger>,
    pub generator: Arc<MockGenerator>,
    pub clock: Arc<ManualClock>,
    pub media: MediaStore,
    pub dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(MediaPolicy::default())
    }

    pub fn with_policy(policy: MediaPolicy) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new(dir.path().join("uploads"));
        let reaper = TempFileReaper::new(media.clone(), Duration::from_secs(3600));
        let messenger = Arc::new(RecordingMessenger::new());
        let generator = Arc::new(MockGenerator::new());
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));

        let dispatcher = Dispatcher::new(
            messenger.clone(),
            generator.clone(),
            media.clone(),
            reaper,
            policy,
        )
        .with_clock(clock.clone());

        Self {
            dispatcher,
            messenger,
            generator,
            clock,
            media,
            dir,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Parse a webhook event from JSON
pub fn event(json: serde_json::Value) -> WebhookEvent {
    serde_json::from_value(json).unwrap()
}

pub fn text_event(event_id: &str, owner: &str, token: &str, text: &str) -> WebhookEvent {
    event(serde_json::json!({
        "type": "message",
        "webhookEventId": event_id,
        "deliveryContext": {"isRedelivery": false},
        "replyToken": token,
        "source": {"type": "user", "userId": owner},
        "message": {"id": format!("msg-{event_id}"), "type": "text", "text": text}
    }))
}

pub fn media_event(event_id: &str, owner: &str, token: &str, kind: &str, media_ref: &str) -> WebhookEvent {
    event(serde_json::json!({
        "type": "message",
        "webhookEventId": event_id,
        "deliveryContext": {"isRedelivery": false},
        "replyToken": token,
        "source": {"type": "user", "userId": owner},
        "message": {"id": media_ref, "type": kind}
    }))
}

pub fn redelivered(mut event: WebhookEvent) -> WebhookEvent {
    event.delivery_context.is_redelivery = true;
    event
}
