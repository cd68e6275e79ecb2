use crate::core::error::ChatError;
use crate::providers::{ProviderFamily, Tuning};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Configured key with `${VAR}` references expanded, else the family's
    /// conventional environment variable.
    pub fn resolved_api_key(&self, family: ProviderFamily) -> Option<String> {
        let key = match &self.api_key {
            Some(raw) => expand_env(raw),
            None => env::var(family.api_key_env()).ok()?,
        };
        if key.trim().is_empty() { None } else { Some(key) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Zero disables the timeout.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub providers: HashMap<ProviderFamily, ProviderConfig>,
    #[serde(default)]
    pub tuning: Option<Tuning>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            providers: HashMap::new(),
            tuning: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".polychat")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Loads the user config, writing a default file on first run.
    pub fn load() -> Result<Config, ChatError> {
        let path = Self::config_path();
        if path.exists() {
            return Self::load_from(&path);
        }

        let config = Config::default();
        if let Err(e) = config.save_to(&path) {
            tracing::warn!(path = %path.display(), "could not write default config: {}", e);
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Config, ChatError> {
        let contents = fs::read_to_string(path)?;
        serde_yml::from_str::<Config>(&contents)
            .map_err(|e| ChatError::Config(format!("Parse {}: {}", path.display(), e)))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ChatError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(path, yaml_content)?;
        Ok(())
    }

    pub fn history_path() -> PathBuf {
        Self::config_dir().join("input_history.txt")
    }
}

fn env_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| match Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}") {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::error!("env reference pattern failed to compile: {}", e);
                None
            }
        })
        .as_ref()
}

/// Replaces `${NAME}` with the variable's value; unset variables become empty.
/// Without a usable pattern the value is returned untouched.
fn expand_env(raw: &str) -> String {
    match env_pattern() {
        Some(pattern) => pattern
            .replace_all(raw, |caps: &Captures| env::var(&caps[1]).unwrap_or_default())
            .into_owned(),
        None => raw.to_string(),
    }
}
