//! # Storefront LLM
//!
//! Chat completion providers used to turn questions into SQL.
//!
//! ## Core Concepts
//! - **Provider**: `LlmProvider` trait over OpenAI-compatible and Anthropic APIs
//! - **Config**: `[llm]` TOML section resolved against the environment
//! - **Usage**: token accounting across calls

pub mod config;
pub mod provider;

pub use config::{LlmConfig, BASE_URL_ENV};
pub use provider::{
    AnthropicProvider, ChatMessage, CompletionRequest, CompletionResponse, FinishReason,
    LlmProvider, OpenAIProvider, ProviderConfig, ProviderError, ProviderType, Role, Usage,
    UsageTracker,
};
