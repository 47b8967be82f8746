//! LLM provider configuration.
//!
//! Deserializes from the `[llm]` section of the TOML config. API keys are
//! never read from the file; they come from `OPENAI_API_KEY` or
//! `ANTHROPIC_API_KEY` at resolve time.

use crate::provider::{ProviderConfig, ProviderType};
use serde::Deserialize;
use storefront_error::{Error, Result};

/// Environment variable that overrides the provider base URL
pub const BASE_URL_ENV: &str = "STOREFRONT_LLM_BASE_URL";

/// LLM provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider to use. Defaults to OpenAI.
    pub provider: ProviderType,

    /// Model identifier. Defaults to the provider's default model.
    pub model: Option<String>,

    /// API base URL. Defaults to the provider's public endpoint.
    pub base_url: Option<String>,

    /// Sampling temperature. Defaults to 0.0 so SQL generation is repeatable.
    pub temperature: f32,

    /// Maximum tokens in the response. Defaults to 1024.
    pub max_tokens: usize,

    /// HTTP request timeout in seconds. Defaults to 120.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::OpenAI,
            model: None,
            base_url: None,
            temperature: 0.0,
            max_tokens: 1024,
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Build a provider configuration using the process environment.
    pub fn resolve(&self) -> Result<ProviderConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Build a provider configuration, looking up keys through `lookup`.
    pub fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<ProviderConfig> {
        let api_key = match self.provider.api_key_env() {
            Some(var) => {
                let key = lookup(var).filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                    Error::config_invalid(format!(
                        "{} is not set; export it or add it to .env to use the {} provider",
                        var, self.provider
                    ))
                    .with_operation("llm::resolve")
                    .with_context("provider", self.provider.as_str())
                })?;
                Some(key)
            }
            None => None,
        };

        let mut config = match self.provider {
            ProviderType::OpenAI => ProviderConfig::openai(api_key.unwrap_or_default()),
            ProviderType::Anthropic => ProviderConfig::anthropic(api_key.unwrap_or_default()),
            ProviderType::Local => ProviderConfig::local("http://localhost:11434/v1", "llama3.1"),
        };

        if let Some(base_url) = lookup(BASE_URL_ENV).or_else(|| self.base_url.clone()) {
            config = config.with_base_url(base_url);
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        Ok(config.with_timeout(self.timeout_secs))
    }
}
