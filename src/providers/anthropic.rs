use crate::providers::{PreparedRequest, ProviderAdapter, ProviderFamily, Tuning, raw_body};
use serde::Serialize;
use serde_json::Value;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Clone)]
pub struct AnthropicAdapter {
    base_url: String,
    api_key: String,
}

impl AnthropicAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        let base_url = ProviderFamily::Anthropic.default_base_url().to_string();
        Self::with_endpoint(base_url, api_key)
    }

    pub fn with_endpoint(endpoint: String, api_key: Option<String>) -> Self {
        let api_key = api_key.unwrap_or_default();
        Self {
            base_url: endpoint,
            api_key,
        }
    }
}

impl ProviderAdapter for AnthropicAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Anthropic
    }

    fn build_request(
        &self,
        provider_id: &str,
        prompt: &str,
        _tuning: Option<&Tuning>,
    ) -> PreparedRequest {
        let payload = AnthropicRequest {
            model: provider_id,
            max_tokens: MAX_TOKENS,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        PreparedRequest {
            endpoint: format!("{}/messages", self.base_url.trim_end_matches('/')),
            headers: vec![
                ("x-api-key".to_string(), self.api_key.clone()),
                (
                    "anthropic-version".to_string(),
                    ANTHROPIC_VERSION.to_string(),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: serde_json::to_value(&payload).unwrap_or(Value::Null),
        }
    }

    fn parse_response(&self, body: &Value) -> String {
        body.pointer("/content/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| raw_body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_messages_request_without_tuning() {
        let adapter = AnthropicAdapter::new(Some("a-key".into()));
        let request =
            adapter.build_request("claude-3-5-haiku-latest", "Hello", Some(&Tuning::default()));

        assert_eq!(request.endpoint, "https://api.anthropic.com/v1/messages");
        assert_eq!(
            request.body,
            json!({
                "model": "claude-3-5-haiku-latest",
                "max_tokens": 1024,
                "messages": [{"role": "user", "content": "Hello"}]
            })
        );
        assert!(
            request
                .headers
                .contains(&("x-api-key".to_string(), "a-key".to_string()))
        );
    }

    #[test]
    fn reads_first_content_block() {
        let adapter = AnthropicAdapter::new(None);
        let body = json!({"content": [{"type": "text", "text": "Hello back"}]});
        assert_eq!(adapter.parse_response(&body), "Hello back");
        assert_eq!(adapter.parse_response(&json!({})), "{}");
    }
}
