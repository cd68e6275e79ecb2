//! Static catalog of selectable models.

use super::ProviderFamily;
use crate::core::error::ChatError;

pub const NO_CAPABILITIES: &str = "(no capabilities)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub family: ProviderFamily,
    /// `false` for group headers.
    pub selectable: bool,
    pub capabilities: Option<&'static str>,
}

const fn header(id: &'static str, label: &'static str, family: ProviderFamily) -> ProviderEntry {
    ProviderEntry {
        id,
        label,
        family,
        selectable: false,
        capabilities: None,
    }
}

const fn model(
    id: &'static str,
    label: &'static str,
    family: ProviderFamily,
    capabilities: &'static str,
) -> ProviderEntry {
    ProviderEntry {
        id,
        label,
        family,
        selectable: true,
        capabilities: Some(capabilities),
    }
}

static PROVIDERS: &[ProviderEntry] = &[
    header("gemini-models", "Google Gemini", ProviderFamily::Gemini),
    model(
        "gemini-2.0-flash",
        "Gemini 2.0 Flash",
        ProviderFamily::Gemini,
        "Fast multimodal model with a 1M token context window; good for everyday chat and summarization.",
    ),
    model(
        "gemini-1.5-flash",
        "Gemini 1.5 Flash",
        ProviderFamily::Gemini,
        "Lightweight model tuned for speed and high-volume tasks.",
    ),
    model(
        "gemini-1.5-pro",
        "Gemini 1.5 Pro",
        ProviderFamily::Gemini,
        "Strong reasoning over long documents and code with a 2M token context window.",
    ),
    header("openai-models", "OpenAI", ProviderFamily::OpenAI),
    model(
        "gpt-4o-mini",
        "GPT-4o mini",
        ProviderFamily::OpenAI,
        "Affordable small model for focused tasks; supports temperature and top-p tuning.",
    ),
    model(
        "gpt-4o",
        "GPT-4o",
        ProviderFamily::OpenAI,
        "Flagship general-purpose model with strong writing and reasoning; supports temperature and top-p tuning.",
    ),
    model(
        "gpt-3.5-turbo",
        "GPT-3.5 Turbo",
        ProviderFamily::OpenAI,
        "Legacy chat model, inexpensive and quick; supports temperature and top-p tuning.",
    ),
    header("mistral-models", "Mistral AI", ProviderFamily::Mistral),
    model(
        "mistral-small-latest",
        "Mistral Small",
        ProviderFamily::Mistral,
        "Efficient model for classification, short answers and translation.",
    ),
    model(
        "mistral-large-latest",
        "Mistral Large",
        ProviderFamily::Mistral,
        "Top-tier reasoning model with multilingual fluency.",
    ),
    model(
        "open-mistral-nemo",
        "Mistral NeMo",
        ProviderFamily::Mistral,
        "Open 12B model with a 128k context window.",
    ),
    header("anthropic-models", "Anthropic", ProviderFamily::Anthropic),
    model(
        "claude-3-5-haiku-latest",
        "Claude 3.5 Haiku",
        ProviderFamily::Anthropic,
        "Fastest Claude model, suited to quick conversational turns.",
    ),
    model(
        "claude-3-5-sonnet-latest",
        "Claude 3.5 Sonnet",
        ProviderFamily::Anthropic,
        "Balanced Claude model with strong coding and analysis skills.",
    ),
];

/// Every registry row in display order, headers included.
pub fn list_providers() -> &'static [ProviderEntry] {
    PROVIDERS
}

pub fn find(id: &str) -> Option<&'static ProviderEntry> {
    PROVIDERS.iter().find(|entry| entry.id == id)
}

/// Looks up a model that can actually be dispatched to.
pub fn resolve(id: &str) -> Result<&'static ProviderEntry, ChatError> {
    match find(id) {
        Some(entry) if entry.selectable => Ok(entry),
        Some(entry) => Err(ChatError::NotSelectable(entry.id.to_string())),
        None => Err(ChatError::UnknownProvider(id.to_string())),
    }
}

pub fn capabilities_of(id: &str) -> &'static str {
    find(id)
        .and_then(|entry| entry.capabilities)
        .unwrap_or(NO_CAPABILITIES)
}

/// First selectable entry; used when nothing is configured.
pub fn default_provider() -> &'static ProviderEntry {
    // The table is static and always holds selectable models.
    &PROVIDERS[1]
}
