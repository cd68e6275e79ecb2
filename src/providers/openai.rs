use super::{PreparedRequest, ProviderAdapter, ProviderFamily, Tuning};
use crate::providers::openai_style::OpenAIStyleClient;
use serde_json::Value;

#[derive(Clone)]
pub struct OpenAIAdapter {
    client: OpenAIStyleClient,
}

impl OpenAIAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        let endpoint = ProviderFamily::OpenAI.default_base_url().to_string();
        Self::with_endpoint(endpoint, api_key)
    }

    pub fn with_endpoint(endpoint: String, api_key: Option<String>) -> Self {
        let api_key = api_key.unwrap_or_default();
        Self {
            client: OpenAIStyleClient::new(endpoint, api_key),
        }
    }
}

impl ProviderAdapter for OpenAIAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::OpenAI
    }

    // Tuning is always sent; defaults fill in when none was chosen.
    fn build_request(
        &self,
        provider_id: &str,
        prompt: &str,
        tuning: Option<&Tuning>,
    ) -> PreparedRequest {
        let tuning = tuning.copied().unwrap_or_default();
        self.client.build_request(provider_id, prompt, Some(&tuning))
    }

    fn parse_response(&self, body: &Value) -> String {
        self.client.parse_response(body)
    }
}
