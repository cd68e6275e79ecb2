use super::{PreparedRequest, ProviderAdapter, ProviderFamily, Tuning};
use crate::providers::openai_style::OpenAIStyleClient;
use serde_json::Value;

/// Mistral speaks the chat-completions shape but never receives tuning.
#[derive(Clone)]
pub struct MistralAdapter {
    client: OpenAIStyleClient,
}

impl MistralAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        let endpoint = ProviderFamily::Mistral.default_base_url().to_string();
        Self::with_endpoint(endpoint, api_key)
    }

    pub fn with_endpoint(endpoint: String, api_key: Option<String>) -> Self {
        let api_key = api_key.unwrap_or_default();
        Self {
            client: OpenAIStyleClient::new(endpoint, api_key),
        }
    }
}

impl ProviderAdapter for MistralAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Mistral
    }

    fn build_request(
        &self,
        provider_id: &str,
        prompt: &str,
        _tuning: Option<&Tuning>,
    ) -> PreparedRequest {
        self.client.build_request(provider_id, prompt, None)
    }

    fn parse_response(&self, body: &Value) -> String {
        self.client.parse_response(body)
    }
}
