use crate::core::error::{ChatError, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub mod anthropic;
pub mod factory;
pub mod gemini;
pub mod mistral;
pub mod openai;
pub mod openai_style;
pub mod registry;
pub mod transport;

pub use factory::{Adapters, ProviderFactory};
pub use registry::ProviderEntry;
pub use transport::HttpTransport;

/// A group of models sharing one request/response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    Gemini,
    OpenAI,
    Mistral,
    Anthropic,
}

impl ProviderFamily {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Some(ProviderFamily::Gemini),
            "openai" => Some(ProviderFamily::OpenAI),
            "mistral" => Some(ProviderFamily::Mistral),
            "anthropic" => Some(ProviderFamily::Anthropic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderFamily::Gemini => "gemini",
            ProviderFamily::OpenAI => "openai",
            ProviderFamily::Mistral => "mistral",
            ProviderFamily::Anthropic => "anthropic",
        }
    }

    pub fn all() -> [ProviderFamily; 4] {
        [
            ProviderFamily::Gemini,
            ProviderFamily::OpenAI,
            ProviderFamily::Mistral,
            ProviderFamily::Anthropic,
        ]
    }

    /// Only the OpenAI chat API accepts `temperature`/`top_p` from us.
    pub fn supports_tuning(&self) -> bool {
        matches!(self, ProviderFamily::OpenAI)
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderFamily::Gemini => "https://generativelanguage.googleapis.com",
            ProviderFamily::OpenAI => "https://api.openai.com/v1",
            ProviderFamily::Mistral => "https://api.mistral.ai/v1",
            ProviderFamily::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    /// Environment variable consulted when no key is configured.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderFamily::Gemini => "GEMINI_API_KEY",
            ProviderFamily::OpenAI => "OPENAI_API_KEY",
            ProviderFamily::Mistral => "MISTRAL_API_KEY",
            ProviderFamily::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningField {
    Temperature,
    TopP,
}

impl TuningField {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "temperature" | "temp" => Some(TuningField::Temperature),
            "top_p" | "topp" | "top-p" => Some(TuningField::TopP),
            _ => None,
        }
    }
}

/// Sampling controls for families that accept them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl Tuning {
    /// Rebuilds the value through `set` so both fields are range-checked.
    pub fn validated(self) -> Result<Self, ChatError> {
        let mut checked = Tuning::default();
        checked.set(TuningField::Temperature, self.temperature)?;
        checked.set(TuningField::TopP, self.top_p)?;
        Ok(checked)
    }

    pub fn set(&mut self, field: TuningField, value: f32) -> Result<(), ChatError> {
        let (name, max) = match field {
            TuningField::Temperature => ("temperature", 2.0),
            TuningField::TopP => ("top_p", 1.0),
        };
        if !(0.0..=max).contains(&value) {
            return Err(ChatError::Tuning(format!(
                "{} must be between 0 and {}, got {}",
                name, max, value
            )));
        }
        match field {
            TuningField::Temperature => self.temperature = value,
            TuningField::TopP => self.top_p = value,
        }
        Ok(())
    }
}

/// A transport-ready request.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs `POST url` with headers and a JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: &PreparedRequest) -> Result<TransportResponse, ChatError>;
}

/// Translates between plain prompts and one family's wire shape.
pub trait ProviderAdapter: Send + Sync {
    fn family(&self) -> ProviderFamily;

    fn build_request(
        &self,
        provider_id: &str,
        prompt: &str,
        tuning: Option<&Tuning>,
    ) -> PreparedRequest;

    /// Extracts reply text, falling back to the serialized body rather than
    /// failing when the expected field is missing.
    fn parse_response(&self, body: &Value) -> String;
}

/// Serialized raw body, shown to the user when no reply field was found.
pub(crate) fn raw_body(body: &Value) -> String {
    serde_json::to_string(body).unwrap_or_else(|_| body.to_string())
}

/// Builds, sends and parses one request. Every failure comes back as a
/// `ProviderError`.
pub async fn send_prompt(
    adapter: &dyn ProviderAdapter,
    transport: &dyn Transport,
    provider_id: &str,
    prompt: &str,
    tuning: Option<&Tuning>,
) -> Result<String, ProviderError> {
    let request = adapter.build_request(provider_id, prompt, tuning);
    tracing::debug!(provider = provider_id, family = %adapter.family(), "sending request");

    let response = transport
        .post(&request)
        .await
        .map_err(|e| ProviderError::new(provider_id, e))?;

    if !response.is_success() {
        tracing::warn!(provider = provider_id, status = response.status, "provider returned error status");
        return Err(ProviderError::new(
            provider_id,
            format!(
                "Request failed with status {}: {}",
                response.status,
                raw_body(&response.body)
            ),
        ));
    }

    Ok(adapter.parse_response(&response.body))
}
