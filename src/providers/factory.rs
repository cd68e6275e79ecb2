use crate::config::{Config, ProviderConfig};
use crate::core::error::ChatError;
use crate::providers::{
    ProviderAdapter, ProviderFamily, anthropic::AnthropicAdapter, gemini::GeminiAdapter,
    mistral::MistralAdapter, openai::OpenAIAdapter,
};
use std::collections::HashMap;

type AdapterCreator = Box<dyn Fn(&ProviderConfig, Option<String>) -> Box<dyn ProviderAdapter> + Send + Sync>;

pub struct ProviderFactory {
    creators: HashMap<ProviderFamily, AdapterCreator>,
}

impl ProviderFactory {
    pub fn new() -> Self {
        let mut creators: HashMap<ProviderFamily, AdapterCreator> = HashMap::new();

        creators.insert(
            ProviderFamily::Gemini,
            Box::new(|config: &ProviderConfig, api_key: Option<String>| {
                let adapter = match &config.base_url {
                    Some(base_url) => GeminiAdapter::with_endpoint(base_url.clone(), api_key),
                    None => GeminiAdapter::new(api_key),
                };
                Box::new(adapter) as Box<dyn ProviderAdapter>
            }) as AdapterCreator,
        );

        creators.insert(
            ProviderFamily::OpenAI,
            Box::new(|config: &ProviderConfig, api_key: Option<String>| {
                let adapter = match &config.base_url {
                    Some(base_url) => OpenAIAdapter::with_endpoint(base_url.clone(), api_key),
                    None => OpenAIAdapter::new(api_key),
                };
                Box::new(adapter) as Box<dyn ProviderAdapter>
            }) as AdapterCreator,
        );

        creators.insert(
            ProviderFamily::Mistral,
            Box::new(|config: &ProviderConfig, api_key: Option<String>| {
                let adapter = match &config.base_url {
                    Some(base_url) => MistralAdapter::with_endpoint(base_url.clone(), api_key),
                    None => MistralAdapter::new(api_key),
                };
                Box::new(adapter) as Box<dyn ProviderAdapter>
            }) as AdapterCreator,
        );

        creators.insert(
            ProviderFamily::Anthropic,
            Box::new(|config: &ProviderConfig, api_key: Option<String>| {
                let adapter = match &config.base_url {
                    Some(base_url) => AnthropicAdapter::with_endpoint(base_url.clone(), api_key),
                    None => AnthropicAdapter::new(api_key),
                };
                Box::new(adapter) as Box<dyn ProviderAdapter>
            }) as AdapterCreator,
        );

        Self { creators }
    }

    pub fn create(
        &self,
        family: ProviderFamily,
        config: &ProviderConfig,
    ) -> Result<Box<dyn ProviderAdapter>, ChatError> {
        let creator = self.creators.get(&family).ok_or_else(|| {
            ChatError::Config(format!("No adapter registered for family: {}", family))
        })?;
        let api_key = config.resolved_api_key(family);
        if api_key.is_none() {
            tracing::debug!(%family, "no API key configured");
        }
        Ok(creator(config, api_key))
    }

    /// One adapter per family, with credentials taken from `config`.
    pub fn build_all(&self, config: &Config) -> Result<Adapters, ChatError> {
        let mut adapters = Adapters::default();
        for family in ProviderFamily::all() {
            let provider_config = config.providers.get(&family).cloned().unwrap_or_default();
            adapters.insert(self.create(family, &provider_config)?);
        }
        Ok(adapters)
    }
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapters keyed by the family they serve.
#[derive(Default)]
pub struct Adapters {
    by_family: HashMap<ProviderFamily, Box<dyn ProviderAdapter>>,
}

impl Adapters {
    /// Registers an adapter under its own family, replacing any previous one.
    pub fn insert(&mut self, adapter: Box<dyn ProviderAdapter>) {
        self.by_family.insert(adapter.family(), adapter);
    }

    pub fn get(&self, family: ProviderFamily) -> Option<&dyn ProviderAdapter> {
        self.by_family.get(&family).map(|adapter| adapter.as_ref())
    }
}
