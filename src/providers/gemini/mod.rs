use crate::providers::{PreparedRequest, ProviderAdapter, ProviderFamily, Tuning, raw_body};
use serde_json::Value;

mod types;

use types::GeminiRequest;

#[derive(Clone)]
pub struct GeminiAdapter {
    base_url: String,
    api_key: String,
}

impl GeminiAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        let base_url = ProviderFamily::Gemini.default_base_url().to_string();
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

impl ProviderAdapter for GeminiAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Gemini
    }

    fn build_request(
        &self,
        provider_id: &str,
        prompt: &str,
        _tuning: Option<&Tuning>,
    ) -> PreparedRequest {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            provider_id,
            self.api_key
        );
        let body = serde_json::to_value(GeminiRequest::from_prompt(prompt)).unwrap_or(Value::Null);

        PreparedRequest {
            endpoint,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }

    fn parse_response(&self, body: &Value) -> String {
        let first_part = body.pointer("/candidates/0/content/parts/0");

        if let Some(text) = first_part.and_then(|p| p.get("text")).and_then(Value::as_str) {
            return text.to_string();
        }

        // A part without text (inline data, function call...) is shown as-is.
        match first_part {
            Some(Value::String(s)) => s.clone(),
            Some(part) => raw_body(part),
            None => raw_body(body),
        }
    }
}
