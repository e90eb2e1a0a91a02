//! Dispatcher scenarios against mock platform and AI collaborators

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Duration;
use line_gemini_gateway::MediaKind;
use line_gemini_gateway::channels::line::WebhookBody;
use line_gemini_gateway::config::MediaPolicy;
use line_gemini_gateway::dispatch::replies;
use line_gemini_gateway::intent::{Intent, prompt_for};

mod common;
use common::{Call, Harness, event, media_event, redelivered, text_event};

#[tokio::test]
async fn file_then_intent_then_general_chat() {
    let h = Harness::new();
    h.messenger.set_content("M1", b"jpeg-bytes");

    h.dispatcher
        .handle_event(media_event("e1", "U1", "t1", "image", "M1"))
        .await;

    let pending = h.dispatcher.pending().get("U1", h.now()).unwrap();
    assert_eq!(pending.media_ref, "M1");
    assert_eq!(pending.kind, MediaKind::Image);
    assert_eq!(
        h.messenger.replies(),
        vec![("t1".to_string(), vec![replies::file_menu(MediaKind::Image)])]
    );
    assert_eq!(h.messenger.content_fetches(), 0);

    h.messenger.clear();
    h.dispatcher
        .handle_event(text_event("e2", "U1", "t2", "summarize this"))
        .await;

    assert_eq!(
        h.messenger.replies(),
        vec![("t2".to_string(), vec![replies::PROCESSING.to_string()])]
    );
    assert_eq!(h.messenger.content_fetches(), 1);

    let file_calls = h.generator.file_calls();
    assert_eq!(file_calls.len(), 1);
    assert_eq!(
        file_calls[0].prompt,
        prompt_for(Intent::Summarize, MediaKind::Image, "")
    );
    assert_eq!(file_calls[0].mime_type.as_deref(), Some("image/jpeg"));
    assert_eq!(
        file_calls[0].data_base64.as_deref(),
        Some(STANDARD.encode(b"jpeg-bytes").as_str())
    );

    let pushes = h.messenger.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].0, "U1");
    assert_eq!(pushes[0].1, vec![replies::file_result("AI answer")]);
    assert!(h.dispatcher.pending().is_empty());
    assert_eq!(h.dispatcher.reaper().pending(), 1);

    h.messenger.clear();
    h.dispatcher
        .handle_event(text_event("e3", "U1", "t3", "translate"))
        .await;

    assert_eq!(h.messenger.content_fetches(), 0);
    assert_eq!(h.generator.file_calls().len(), 1);
    let last = h.generator.calls().last().cloned().unwrap();
    assert!(last.mime_type.is_none());
    assert_eq!(last.prompt, replies::chat_prompt("translate"));
    assert_eq!(
        h.messenger.replies(),
        vec![("t3".to_string(), vec!["AI answer".to_string()])]
    );
}

#[tokio::test]
async fn expired_file_is_reported_and_removed() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(media_event("e1", "U2", "t1", "file", "F1"))
        .await;

    h.clock.advance(Duration::minutes(11));
    assert!(h.dispatcher.pending().get("U2", h.now()).is_none());

    h.messenger.clear();
    h.dispatcher
        .handle_event(text_event("e2", "U2", "t2", "analyze"))
        .await;

    assert_eq!(
        h.messenger.replies(),
        vec![("t2".to_string(), vec![replies::FILE_EXPIRED.to_string()])]
    );
    assert_eq!(h.messenger.content_fetches(), 0);
    assert!(h.generator.calls().is_empty());
    assert!(h.dispatcher.pending().is_empty());
}

#[tokio::test]
async fn invalid_token_on_ack_aborts_quietly() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(media_event("e1", "U1", "t1", "image", "M1"))
        .await;

    h.messenger.invalidate_token("t2");
    h.messenger.clear();
    h.dispatcher
        .handle_event(text_event("e2", "U1", "t2", "summarize"))
        .await;

    assert!(h.messenger.replies().is_empty());
    assert!(h.messenger.pushes().is_empty());
    assert_eq!(h.messenger.content_fetches(), 0);
    assert!(h.generator.calls().is_empty());
    // The file is still waiting for another try
    assert_eq!(
        h.dispatcher.pending().get("U1", h.now()).unwrap().media_ref,
        "M1"
    );
}

#[tokio::test]
async fn redelivered_events_have_no_effect() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(redelivered(media_event("e1", "U1", "t1", "image", "M1")))
        .await;
    h.dispatcher
        .handle_event(redelivered(text_event("e2", "U1", "t2", "hello")))
        .await;

    assert!(!h.messenger.has_side_effects());
    assert!(h.generator.calls().is_empty());
    assert!(h.dispatcher.pending().is_empty());
}

#[tokio::test]
async fn duplicate_event_id_is_processed_once() {
    let h = Harness::new();
    let ev = text_event("same-id", "U1", "t1", "hello");

    h.dispatcher.handle_event(ev.clone()).await;
    let after_first = h.messenger.calls().len();
    h.dispatcher.handle_event(ev).await;

    assert_eq!(h.messenger.calls().len(), after_first);
    assert_eq!(h.generator.calls().len(), 1);
}

#[tokio::test]
async fn text_without_pending_file_never_fetches_content() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(text_event("e1", "U9", "t1", "อ่านข้อความให้หน่อย"))
        .await;

    assert_eq!(h.messenger.content_fetches(), 0);
    assert!(h.generator.file_calls().is_empty());
    assert_eq!(h.generator.calls().len(), 1);
}

#[tokio::test]
async fn newer_file_replaces_pending_entry() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(media_event("e1", "U1", "t1", "image", "M1"))
        .await;
    h.dispatcher
        .handle_event(media_event("e2", "U1", "t2", "audio", "M2"))
        .await;

    assert_eq!(h.dispatcher.pending().len(), 1);
    let entry = h.dispatcher.pending().get("U1", h.now()).unwrap();
    assert_eq!(entry.media_ref, "M2");
    assert_eq!(entry.kind, MediaKind::Audio);
}

#[tokio::test]
async fn failed_file_menu_does_not_capture_next_text() {
    let h = Harness::new();
    h.messenger.fail_replies_on("t1");

    h.dispatcher
        .handle_event(media_event("e1", "U1", "t1", "image", "M1"))
        .await;
    assert!(h.dispatcher.pending().is_empty());

    h.dispatcher
        .handle_event(text_event("e2", "U1", "t2", "what is the weather"))
        .await;

    assert_eq!(h.messenger.content_fetches(), 0);
    assert!(h.generator.file_calls().is_empty());
    assert_eq!(h.generator.calls().len(), 1);
    assert_eq!(
        h.messenger.replies(),
        vec![("t2".to_string(), vec!["AI answer".to_string()])]
    );
}

#[tokio::test]
async fn audio_intent_uses_transcription_prompt() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(media_event("e1", "U1", "t1", "audio", "A1"))
        .await;
    h.dispatcher
        .handle_event(text_event("e2", "U1", "t2", "ถอดเสียงให้หน่อย"))
        .await;

    let calls = h.generator.file_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].prompt,
        prompt_for(Intent::Transcribe, MediaKind::Audio, "")
    );
    assert_eq!(calls[0].mime_type.as_deref(), Some("audio/x-m4a"));
}

#[tokio::test]
async fn content_failure_pushes_notice_and_keeps_file() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(media_event("e1", "U1", "t1", "video", "V1"))
        .await;
    h.messenger.fail_content(true);

    h.messenger.clear();
    h.dispatcher
        .handle_event(text_event("e2", "U1", "t2", "summarize"))
        .await;

    // Ack used the reply token, so the failure notice goes by push
    assert_eq!(
        h.messenger.pushes(),
        vec![("U1".to_string(), vec![replies::PROCESSING_FAILED.to_string()])]
    );
    assert!(h.generator.calls().is_empty());
    assert!(h.dispatcher.pending().get("U1", h.now()).is_some());

    // A retry goes through once the content is available
    h.messenger.fail_content(false);
    h.dispatcher
        .handle_event(text_event("e3", "U1", "t3", "summarize"))
        .await;
    assert_eq!(h.generator.file_calls().len(), 1);
    assert!(h.dispatcher.pending().is_empty());
}

#[tokio::test]
async fn generation_failure_sends_generic_notice() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(media_event("e1", "U1", "t1", "image", "M1"))
        .await;
    h.generator.set_failing(true);

    h.messenger.clear();
    h.dispatcher
        .handle_event(text_event("e2", "U1", "t2", "translate"))
        .await;

    assert_eq!(
        h.messenger.pushes(),
        vec![("U1".to_string(), vec![replies::PROCESSING_FAILED.to_string()])]
    );
    // Saved file still goes to the reaper
    assert_eq!(h.dispatcher.reaper().pending(), 1);
}

#[tokio::test]
async fn disallowed_mime_type_is_refused() {
    let policy = MediaPolicy {
        allowed_mime_types: vec!["application/pdf".to_string()],
        ..MediaPolicy::default()
    };
    let h = Harness::with_policy(policy);
    h.dispatcher
        .handle_event(media_event("e1", "U1", "t1", "image", "M1"))
        .await;

    h.messenger.clear();
    h.dispatcher
        .handle_event(text_event("e2", "U1", "t2", "analyze"))
        .await;

    assert!(h.generator.calls().is_empty());
    assert_eq!(
        h.messenger.pushes(),
        vec![("U1".to_string(), vec![replies::UNSUPPORTED_FILE.to_string()])]
    );
    assert!(h.dispatcher.pending().is_empty());
}

#[tokio::test]
async fn oversized_file_is_refused_before_saving() {
    let policy = MediaPolicy {
        max_file_size: 4,
        ..MediaPolicy::default()
    };
    let h = Harness::with_policy(policy);
    h.messenger.set_content("D1", b"0123456789");
    h.dispatcher
        .handle_event(media_event("e1", "U1", "t1", "file", "D1"))
        .await;
    h.dispatcher
        .handle_event(text_event("e2", "U1", "t2", "สรุป"))
        .await;

    assert!(h.generator.calls().is_empty());
    assert_eq!(h.dispatcher.reaper().pending(), 0);
    let pushes = h.messenger.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].1, vec![replies::UNSUPPORTED_FILE.to_string()]);
}

#[tokio::test]
async fn concurrent_intents_process_file_once() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(media_event("e1", "U1", "t1", "image", "M1"))
        .await;

    tokio::join!(
        h.dispatcher
            .handle_event(text_event("e2", "U1", "t2", "summarize")),
        h.dispatcher
            .handle_event(text_event("e3", "U1", "t3", "translate")),
    );

    assert_eq!(h.messenger.content_fetches(), 1);
    assert_eq!(h.generator.file_calls().len(), 1);
    assert!(h.dispatcher.pending().is_empty());
}

#[tokio::test]
async fn help_greets_user_by_name() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(text_event("e1", "U1", "t1", "HELP me"))
        .await;

    assert!(h.messenger.calls().contains(&Call::Profile {
        user_id: "U1".to_string()
    }));
    let sent = h.messenger.replies();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, vec![replies::help(Some("Tester"))]);
    assert!(h.generator.calls().is_empty());
}

#[tokio::test]
async fn status_reports_uptime() {
    let h = Harness::new();
    h.clock.advance(Duration::minutes(42));
    h.dispatcher
        .handle_event(text_event("e1", "U1", "t1", "สถานะ"))
        .await;

    let sent = h.messenger.replies();
    assert_eq!(sent[0].1, vec![replies::status(42, h.now())]);
}

#[tokio::test]
async fn chat_failure_sends_apology() {
    let h = Harness::new();
    h.generator.set_failing(true);
    h.dispatcher
        .handle_event(text_event("e1", "U1", "t1", "สวัสดี"))
        .await;

    assert_eq!(
        h.messenger.replies(),
        vec![("t1".to_string(), vec![replies::CHAT_FAILED.to_string()])]
    );
}

#[tokio::test]
async fn unsupported_message_gets_canned_reply() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(event(serde_json::json!({
            "type": "message",
            "webhookEventId": "e1",
            "replyToken": "t1",
            "source": {"type": "user", "userId": "U1"},
            "message": {"id": "s1", "type": "sticker", "packageId": "1", "stickerId": "2"}
        })))
        .await;

    assert_eq!(
        h.messenger.replies(),
        vec![("t1".to_string(), vec![replies::UNSUPPORTED_MESSAGE.to_string()])]
    );
}

#[tokio::test]
async fn non_message_events_are_skipped() {
    let h = Harness::new();
    h.dispatcher
        .handle_event(event(serde_json::json!({
            "type": "follow",
            "webhookEventId": "e1",
            "replyToken": "t1",
            "source": {"type": "user", "userId": "U1"}
        })))
        .await;

    assert!(!h.messenger.has_side_effects());
}

#[tokio::test]
async fn batch_is_processed_in_order() {
    let h = Harness::new();
    let body = WebhookBody {
        destination: Some("Ubot".to_string()),
        events: vec![
            media_event("e1", "U1", "t1", "image", "M1"),
            text_event("e2", "U1", "t2", "read"),
        ],
    };
    h.dispatcher.handle(body).await;

    let calls = h.generator.file_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, prompt_for(Intent::Read, MediaKind::Image, ""));
    assert!(h.dispatcher.pending().is_empty());
}
