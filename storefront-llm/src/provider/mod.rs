//! # LLM Provider Interface
//!
//! A trait-based abstraction for chat completion backends.
//!
//! ## Design
//! - `LlmProvider` trait defines the request/response interface
//! - Implementations for OpenAI-compatible APIs and Anthropic Messages
//! - `ProviderError` classifies failures so callers can decide to retry
//! - Usage tracking across calls

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAIProvider;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Core Types

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Request parameters for a completion
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = Some(max);
        self
    }
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub content: Option<String>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Unknown,
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

// Provider Trait

/// Error type for provider operations
#[derive(Debug)]
pub enum ProviderError {
    /// Network/connection error (including timeouts)
    Network(String),
    /// API returned an error
    Api { status: u16, message: String },
    /// Failed to parse response
    Parse(String),
    /// Rate limited
    RateLimited { retry_after: Option<u64> },
    /// Invalid request
    InvalidRequest(String),
    /// Model not found
    ModelNotFound(String),
    /// Authentication failed
    AuthenticationFailed,
    /// Other error
    Other(String),
}

impl ProviderError {
    /// Whether the same request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Classify a non-success HTTP response.
    pub(crate) fn from_status(status: u16, retry_after: Option<u64>, body: String) -> Self {
        match status {
            429 => Self::RateLimited { retry_after },
            401 | 403 => Self::AuthenticationFailed,
            400 | 422 => Self::InvalidRequest(body),
            404 => Self::ModelNotFound(body),
            _ => Self::Api {
                status,
                message: body,
            },
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(e) => write!(f, "provider unreachable: {}", e),
            Self::Api { status, message } => write!(f, "provider returned HTTP {}: {}", status, message),
            Self::Parse(e) => write!(f, "unreadable provider reply: {}", e),
            Self::RateLimited { retry_after: Some(secs) } => write!(f, "rate limited, retry after {}s", secs),
            Self::RateLimited { retry_after: None } => write!(f, "rate limited"),
            Self::InvalidRequest(e) => write!(f, "request rejected: {}", e),
            Self::ModelNotFound(m) => write!(f, "unknown model: {}", m),
            Self::AuthenticationFailed => write!(f, "API key rejected"),
            Self::Other(e) => f.write_str(e),
        }
    }
}

impl std::error::Error for ProviderError {}

/// The main LLM provider trait
#[allow(async_fn_in_trait)]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn name(&self) -> &str;

    /// Get the default model
    fn default_model(&self) -> &str;

    /// Send a completion request and get a full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;
}

/// Send a JSON request and decode a JSON response, mapping failures.
pub(crate) async fn send_json<T: serde::de::DeserializeOwned>(
    req: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = req.send().await.map_err(|e| ProviderError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let text = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status.as_u16(), retry_after, text));
    }

    response.json().await.map_err(|e| ProviderError::Parse(e.to_string()))
}

pub(crate) fn http_client(config: &ProviderConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs.unwrap_or(120)))
        .build()
        .map_err(|e| ProviderError::Other(format!("Failed to create HTTP client: {}", e)))
}

// Provider Configuration

/// Configuration for creating providers
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub default_model: Option<String>,
    pub headers: HashMap<String, String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    OpenAI,
    Anthropic,
    /// OpenAI-compatible server that needs no key (Ollama, vLLM)
    Local,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Local => "local",
        }
    }

    /// Environment variable holding the API key, if the provider needs one
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderType::Local => None,
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderType::OpenAI),
            "anthropic" => Ok(ProviderType::Anthropic),
            "local" => Ok(ProviderType::Local),
            other => Err(format!("unknown provider '{}' (expected openai, anthropic or local)", other)),
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::OpenAI,
            api_key: Some(api_key.into()),
            base_url: Some("https://api.openai.com/v1".into()),
            default_model: Some("gpt-4o".into()),
            headers: HashMap::new(),
            timeout_secs: Some(120),
        }
    }

    pub fn anthropic(api_key: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("anthropic-version".into(), "2023-06-01".into());

        Self {
            provider_type: ProviderType::Anthropic,
            api_key: Some(api_key.into()),
            base_url: Some("https://api.anthropic.com/v1".into()),
            default_model: Some("claude-sonnet-4-20250514".into()),
            headers,
            timeout_secs: Some(120),
        }
    }

    pub fn local(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::Local,
            api_key: None,
            base_url: Some(base_url.into()),
            default_model: Some(model.into()),
            headers: HashMap::new(),
            timeout_secs: Some(300),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

// Usage Tracking

/// Tracks token usage across multiple calls
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    pub total_calls: usize,
    pub total_prompt_tokens: usize,
    pub total_completion_tokens: usize,
    pub by_model: HashMap<String, Usage>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, model: &str, usage: &Usage) {
        self.total_calls += 1;
        self.total_prompt_tokens += usage.prompt_tokens;
        self.total_completion_tokens += usage.completion_tokens;

        let entry = self.by_model.entry(model.to_string()).or_default();
        entry.prompt_tokens += usage.prompt_tokens;
        entry.completion_tokens += usage.completion_tokens;
        entry.total_tokens += usage.total_tokens;
    }

    pub fn total_tokens(&self) -> usize {
        self.total_prompt_tokens + self.total_completion_tokens
    }

    /// One-line summary, e.g. `2 calls, 450 tokens (300 prompt / 150 completion)`
    pub fn summary(&self) -> String {
        format!(
            "{} call{}, {} tokens ({} prompt / {} completion)",
            self.total_calls,
            if self.total_calls == 1 { "" } else { "s" },
            self.total_tokens(),
            self.total_prompt_tokens,
            self.total_completion_tokens
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_sql_conversation() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("Answer with one SELECT"),
            ChatMessage::user("Question: top stores"),
            ChatMessage::assistant("SELECT 1"),
        ])
        .with_model("gpt-4o-mini")
        .with_temperature(0.0)
        .with_max_tokens(512);

        let roles: Vec<&str> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant"]);
        assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(request.max_tokens, Some(512));
    }

    #[test]
    fn test_provider_config() {
        let config = ProviderConfig::openai("key").with_model("gpt-4o-mini");
        assert_eq!(config.default_model.as_deref(), Some("gpt-4o-mini"));

        let config = ProviderConfig::anthropic("key").with_base_url("http://127.0.0.1:9");
        assert_eq!(config.base_url.as_deref(), Some("http://127.0.0.1:9"));
        assert!(config.headers.contains_key("anthropic-version"));

        let config = ProviderConfig::local("http://localhost:11434/v1", "llama3").with_timeout(30);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_secs, Some(30));
    }

    #[test]
    fn test_provider_type_parse() {
        assert_eq!("OpenAI".parse::<ProviderType>().unwrap(), ProviderType::OpenAI);
        assert_eq!("anthropic".parse::<ProviderType>().unwrap(), ProviderType::Anthropic);
        assert!("bard".parse::<ProviderType>().is_err());
        assert_eq!(ProviderType::Local.api_key_env(), None);
    }

    #[test]
    fn test_error_classification() {
        assert!(ProviderError::from_status(429, Some(3), String::new()).is_retryable());
        assert!(ProviderError::from_status(503, None, "overloaded".into()).is_retryable());
        assert!(ProviderError::Network("reset".into()).is_retryable());
        assert!(!ProviderError::from_status(401, None, String::new()).is_retryable());
        assert!(matches!(
            ProviderError::from_status(400, None, "bad".into()),
            ProviderError::InvalidRequest(_)
        ));
        assert!(matches!(
            ProviderError::from_status(404, None, "no such model".into()),
            ProviderError::ModelNotFound(_)
        ));
        assert_eq!(
            ProviderError::RateLimited { retry_after: Some(3) }.to_string(),
            "rate limited, retry after 3s"
        );
    }

    #[test]
    fn test_usage_tracker() {
        let mut tracker = UsageTracker::new();
        for (prompt, completion) in [(100, 50), (200, 100)] {
            let usage = Usage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            };
            tracker.track("gpt-4o", &usage);
        }

        assert_eq!(tracker.total_calls, 2);
        assert_eq!(tracker.total_prompt_tokens, 300);
        assert_eq!(tracker.total_completion_tokens, 150);
        assert_eq!(tracker.total_tokens(), 450);
        assert_eq!(tracker.by_model["gpt-4o"].total_tokens, 450);
        assert_eq!(tracker.summary(), "2 calls, 450 tokens (300 prompt / 150 completion)");
    }
}
