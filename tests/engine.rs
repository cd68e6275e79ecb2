//! Tests for `ChatEngine` dispatch against a scripted transport.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use polychat::chat::{ChatEngine, SendOutcome, Sender};
use polychat::core::Clock;
use polychat::providers::anthropic::AnthropicAdapter;
use polychat::providers::gemini::GeminiAdapter;
use polychat::providers::mistral::MistralAdapter;
use polychat::providers::openai::OpenAIAdapter;
use polychat::providers::registry;
use polychat::providers::{
    Adapters, PreparedRequest, Transport, TransportResponse, Tuning, TuningField,
};
use polychat::ChatError;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

enum Scripted {
    Reply(u16, Value),
    Fail(&'static str),
}

/// Answers requests from a queue and records what was sent.
#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<PreparedRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    /// Holds every request until `gate` is notified.
    fn gated(script: Vec<Scripted>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(script)
        }
    }

    fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, request: &PreparedRequest) -> Result<TransportResponse, ChatError> {
        self.requests.lock().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.script.lock().pop_front() {
            Some(Scripted::Reply(status, body)) => Ok(TransportResponse { status, body }),
            Some(Scripted::Fail(reason)) => Err(ChatError::Network(reason.to_string())),
            None => Err(ChatError::Network("no scripted response".to_string())),
        }
    }
}

/// Advances one second per reading.
struct StepClock {
    next: Mutex<DateTime<Utc>>,
}

impl StepClock {
    fn new() -> Self {
        Self {
            next: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock();
        let now = *next;
        *next = now + Duration::seconds(1);
        now
    }
}

fn gemini_reply(text: &str) -> Scripted {
    Scripted::Reply(
        200,
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}),
    )
}

fn openai_reply(text: &str) -> Scripted {
    Scripted::Reply(
        200,
        json!({"choices": [{"message": {"role": "assistant", "content": text}}]}),
    )
}

fn adapters() -> Adapters {
    let mut adapters = Adapters::default();
    adapters.insert(Box::new(GeminiAdapter::new(Some("g-key".into()))));
    adapters.insert(Box::new(OpenAIAdapter::new(Some("o-key".into()))));
    adapters.insert(Box::new(MistralAdapter::new(Some("m-key".into()))));
    adapters.insert(Box::new(AnthropicAdapter::new(Some("a-key".into()))));
    adapters
}

fn engine_with(transport: Arc<ScriptedTransport>, provider_id: &str) -> ChatEngine {
    ChatEngine::new(
        adapters(),
        transport,
        Arc::new(StepClock::new()),
        provider_id,
        Tuning::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_reply_is_appended_after_user_message() {
    let transport = Arc::new(ScriptedTransport::new(vec![gemini_reply("Hi there")]));
    let engine = engine_with(transport.clone(), "gemini-2.0-flash");

    let outcome = engine.send_message("Hello").await;
    assert!(matches!(outcome, SendOutcome::Replied { conversation_id: 1, .. }));

    let conversation = engine.active_conversation();
    let messages = conversation.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "Hello");
    assert_eq!(messages[1].sender, Sender::Assistant);
    assert_eq!(messages[1].text, "Hi there");
    assert!(messages[0].timestamp < messages[1].timestamp);
    assert_eq!(conversation.title(), "Hello");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].endpoint.contains("gemini-2.0-flash:generateContent"));
    assert_eq!(
        requests[0].body,
        json!({"contents": [{"parts": [{"text": "Hello"}]}]})
    );
}

#[tokio::test]
async fn test_reply_carries_model_debug_info() {
    let transport = Arc::new(ScriptedTransport::new(vec![gemini_reply("Hi there")]));
    let engine = engine_with(transport, "gemini-2.0-flash");

    let outcome = engine.send_message("Hello").await;
    let expected = format!(
        "Model: gemini-2.0-flash\n{}",
        registry::capabilities_of("gemini-2.0-flash")
    );
    assert_eq!(
        outcome.reply().and_then(|m| m.debug_info.clone()),
        Some(expected)
    );
}

#[tokio::test]
async fn test_network_failure_becomes_error_message() {
    let transport = Arc::new(ScriptedTransport::new(vec![Scripted::Fail(
        "connection refused",
    )]));
    let engine = engine_with(transport, "gemini-2.0-flash");

    let outcome = engine.send_message("Hello").await;
    let SendOutcome::Failed { message, error, .. } = outcome else {
        panic!("expected a failed outcome");
    };
    assert_eq!(error.provider_id, "gemini-2.0-flash");
    assert!(message.text.starts_with("Error calling API: "));
    assert!(message.text.contains("connection refused"));

    let conversation = engine.active_conversation();
    assert_eq!(conversation.messages().len(), 2);
    assert_eq!(conversation.messages()[1], message);
    assert!(!engine.is_awaiting_reply());
}

#[tokio::test]
async fn test_error_status_becomes_error_message() {
    let transport = Arc::new(ScriptedTransport::new(vec![Scripted::Reply(
        500,
        json!({"error": "boom"}),
    )]));
    let engine = engine_with(transport, "gemini-2.0-flash");

    let outcome = engine.send_message("Hello").await;
    let message = outcome.reply().unwrap();
    assert!(matches!(outcome, SendOutcome::Failed { .. }));
    assert!(message.text.starts_with("Error calling API: "));
    assert!(message.text.contains("Request failed with status 500"));
    assert!(message.text.contains("boom"));
}

#[tokio::test]
async fn test_blank_messages_are_skipped() {
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let engine = engine_with(transport.clone(), "gemini-2.0-flash");

    assert_eq!(engine.send_message("").await, SendOutcome::Skipped);
    assert_eq!(engine.send_message("   \n\t").await, SendOutcome::Skipped);

    assert!(engine.active_conversation().messages().is_empty());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_renamed_title_survives_sends() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        gemini_reply("one"),
        gemini_reply("two"),
    ]));
    let engine = engine_with(transport, "gemini-2.0-flash");

    engine.rename_conversation(1, "Pinned").unwrap();
    engine.send_message("first").await;
    engine.send_message("second").await;

    let conversation = engine.active_conversation();
    assert_eq!(conversation.title(), "Pinned");
    assert!(conversation.is_title_locked());
    assert_eq!(conversation.messages().len(), 4);
}

#[tokio::test]
async fn test_title_follows_user_messages() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        gemini_reply("one"),
        gemini_reply("two"),
    ]));
    let engine = engine_with(transport, "gemini-2.0-flash");

    engine.send_message("Plan a trip").await;
    engine.send_message("to Lisbon").await;

    assert_eq!(engine.active_conversation().title(), "Plan a trip to Lisbon");
}

#[tokio::test]
async fn test_switching_provider_opens_one_greeting_conversation() {
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let engine = engine_with(transport.clone(), "gemini-2.0-flash");

    let new_id = engine.select_provider("mistral-small-latest").unwrap();
    let new_id = new_id.expect("a switch opens a conversation");

    let conversations = engine.conversations();
    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0].id(), new_id);

    let active = engine.active_conversation();
    assert_eq!(active.id(), new_id);
    assert_eq!(active.messages().len(), 1);
    let greeting = &active.messages()[0];
    assert_eq!(greeting.sender, Sender::Assistant);
    assert!(greeting.text.contains("Mistral Small"));
    assert!(greeting.text.contains(registry::capabilities_of("mistral-small-latest")));
    assert_eq!(active.title(), "New Conversation");

    // Nothing is sent to announce the switch.
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_reselecting_current_provider_opens_nothing() {
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let engine = engine_with(transport, "gemini-2.0-flash");

    assert_eq!(engine.select_provider("gemini-2.0-flash").unwrap(), None);
    assert_eq!(engine.conversations().len(), 1);
}

#[tokio::test]
async fn test_header_selection_is_rejected() {
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let engine = engine_with(transport, "gemini-2.0-flash");

    let err = engine.select_provider("openai-models").unwrap_err();
    assert!(matches!(err, ChatError::NotSelectable(_)));
    assert!(matches!(
        engine.select_provider("no-such-model"),
        Err(ChatError::UnknownProvider(_))
    ));
    assert_eq!(engine.current_provider().id, "gemini-2.0-flash");
    assert_eq!(engine.conversations().len(), 1);
}

#[tokio::test]
async fn test_send_after_switch_goes_to_new_provider() {
    let transport = Arc::new(ScriptedTransport::new(vec![openai_reply("Hello from GPT")]));
    let engine = engine_with(transport.clone(), "gemini-2.0-flash");

    let new_id = engine.select_provider("gpt-4o").unwrap().unwrap();
    let outcome = engine.send_message("Hi").await;

    assert!(matches!(outcome, SendOutcome::Replied { conversation_id, .. } if conversation_id == new_id));
    let active = engine.active_conversation();
    assert_eq!(active.messages().len(), 3);
    assert_eq!(active.messages()[2].text, "Hello from GPT");
    assert_eq!(active.title(), "Hi");
    assert!(transport.requests()[0].endpoint.ends_with("/chat/completions"));
}

#[tokio::test]
async fn test_initial_message_is_sent_once() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        gemini_reply("welcome"),
        gemini_reply("unused"),
    ]));
    let engine = engine_with(transport.clone(), "gemini-2.0-flash");

    let first = engine.send_initial_message("Summarize this").await;
    let second = engine.send_initial_message("Summarize this").await;

    assert!(matches!(first, SendOutcome::Replied { .. }));
    assert_eq!(second, SendOutcome::Skipped);
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(engine.active_conversation().messages().len(), 2);
}

#[tokio::test]
async fn test_blank_initial_message_keeps_the_guard() {
    let transport = Arc::new(ScriptedTransport::new(vec![gemini_reply("welcome")]));
    let engine = engine_with(transport.clone(), "gemini-2.0-flash");

    assert_eq!(engine.send_initial_message("  ").await, SendOutcome::Skipped);
    let outcome = engine.send_initial_message("Summarize this").await;

    assert!(matches!(outcome, SendOutcome::Replied { .. }));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_openai_requests_carry_tuning() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        openai_reply("ok"),
        openai_reply("ok"),
    ]));
    let engine = engine_with(transport.clone(), "gpt-4o-mini");

    engine.send_message("first").await;
    engine.set_tuning(TuningField::Temperature, 1.5).unwrap();
    engine.send_message("second").await;

    let requests = transport.requests();
    let temperature = |body: &Value| body["temperature"].as_f64().unwrap();
    let top_p = |body: &Value| body["top_p"].as_f64().unwrap();
    assert!((temperature(&requests[0].body) - 0.7).abs() < 1e-6);
    assert!((top_p(&requests[0].body) - 0.9).abs() < 1e-6);
    assert!((temperature(&requests[1].body) - 1.5).abs() < 1e-6);
}

#[tokio::test]
async fn test_gemini_requests_carry_no_tuning() {
    let transport = Arc::new(ScriptedTransport::new(vec![gemini_reply("ok")]));
    let engine = engine_with(transport.clone(), "gemini-2.0-flash");

    assert!(engine.tuning().is_none());
    assert!(matches!(
        engine.set_tuning(TuningField::TopP, 0.5),
        Err(ChatError::Tuning(_))
    ));
    engine.send_message("Hello").await;

    let body = transport.requests()[0].body.to_string();
    assert!(!body.contains("temperature"));
    assert!(!body.contains("top_p"));
}

#[tokio::test]
async fn test_in_flight_reply_lands_in_original_conversation() {
    let gate = Arc::new(Notify::new());
    let transport = Arc::new(ScriptedTransport::gated(
        vec![gemini_reply("late answer")],
        gate.clone(),
    ));
    let engine = engine_with(transport, "gemini-2.0-flash");

    let send = engine.send_message("Slow question");
    let switch = async {
        while !engine.is_awaiting_reply() {
            tokio::task::yield_now().await;
        }
        let new_id = engine.select_provider("gpt-4o").unwrap().unwrap();

        // The new conversation is idle while the old one still waits.
        assert!(!engine.is_awaiting_reply());
        assert!(engine.is_conversation_awaiting(1));

        gate.notify_one();
        new_id
    };
    let (outcome, new_id) = futures::join!(send, switch);

    assert!(matches!(outcome, SendOutcome::Replied { conversation_id: 1, .. }));
    assert!(!engine.is_conversation_awaiting(1));

    let original = engine.conversation(1).unwrap();
    assert_eq!(original.messages().len(), 2);
    assert_eq!(original.messages()[1].text, "late answer");
    assert_eq!(
        original.messages()[1].debug_info.as_deref().and_then(|i| i.lines().next()),
        Some("Model: gemini-2.0-flash")
    );

    let active = engine.active_conversation();
    assert_eq!(active.id(), new_id);
    assert_eq!(active.messages().len(), 1);
}

#[tokio::test]
async fn test_missing_adapter_fails_the_turn() {
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let engine = ChatEngine::new(
        Adapters::default(),
        transport.clone(),
        Arc::new(StepClock::new()),
        "claude-3-5-haiku-latest",
        Tuning::default(),
    )
    .unwrap();

    let outcome = engine.send_message("Hello").await;
    assert!(matches!(outcome, SendOutcome::Failed { .. }));
    assert!(transport.requests().is_empty());
}
