use std::io;
use thiserror::Error;

/// Unified error type for polychat
#[derive(Error, Debug)]
pub enum ChatError {
    /// API-related errors (non-success status, unexpected payloads)
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Registry entries that only group other entries
    #[error("Provider '{0}' is a group header and cannot be selected")]
    NotSelectable(String),

    #[error("Unknown conversation: {0}")]
    UnknownConversation(u64),

    /// Tuning rejected for range or for a family that ignores it
    #[error("Tuning error: {0}")]
    Tuning(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        // The URL may carry an API key in its query string.
        let err = err.without_url();
        if err.is_timeout() {
            ChatError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ChatError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            ChatError::Api(format!("API returned error status: {}", err))
        } else {
            ChatError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for ChatError {
    fn from(err: serde_yml::Error) -> Self {
        ChatError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<rustyline::error::ReadlineError> for ChatError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        ChatError::Input(format!("Line editor error: {}", err))
    }
}

/// A failed provider call.
///
/// This is the only failure that crosses the adapter boundary. The dispatch
/// engine turns it into an assistant message instead of propagating it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub provider_id: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider_id: &str, message: impl ToString) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_message_only() {
        let err = ProviderError::new("gpt-4o", "Connection failed: refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
        assert_eq!(err.provider_id, "gpt-4o");
    }

    #[test]
    fn io_errors_convert() {
        let err: ChatError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().starts_with("IO error: "));
    }
}
