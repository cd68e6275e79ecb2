use crate::providers::{PreparedRequest, Tuning, raw_body};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Request/response shape shared by the `/chat/completions` APIs.
#[derive(Clone)]
pub struct OpenAIStyleClient {
    base_url: String,
    api_key: String,
}

impl OpenAIStyleClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self { base_url, api_key }
    }

    pub fn build_request(
        &self,
        model: &str,
        prompt: &str,
        tuning: Option<&Tuning>,
    ) -> PreparedRequest {
        let payload = ChatCompletionRequest {
            model,
            messages: vec![ChatCompletionMessage {
                role: "user",
                content: prompt,
            }],
            temperature: tuning.map(|t| t.temperature),
            top_p: tuning.map(|t| t.top_p),
        };

        PreparedRequest {
            endpoint: format!("{}/chat/completions", self.base_url.trim_end_matches('/')),
            headers: vec![
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.api_key),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: serde_json::to_value(&payload).unwrap_or(Value::Null),
        }
    }

    /// `choices[0].message.content`, else the raw body.
    pub fn parse_response(&self, body: &Value) -> String {
        body.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| raw_body(body))
    }
}
