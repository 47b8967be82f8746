//! Scripted in-memory provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use storefront_llm::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, ProviderError, Usage,
};

/// Replays queued replies in order and records every request it receives.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<(String, FinishReason), ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, content: impl Into<String>) -> Self {
        self.push(Ok((content.into(), FinishReason::Stop)))
    }

    /// A reply the model stopped early because it hit the token limit
    pub fn truncated(self, content: impl Into<String>) -> Self {
        self.push(Ok((content.into(), FinishReason::Length)))
    }

    pub fn fail(self, error: ProviderError) -> Self {
        self.push(Err(error))
    }

    fn push(self, item: Result<(String, FinishReason), ProviderError>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(item);
        }
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let (content, finish_reason) = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Err(ProviderError::Other("script exhausted".into())))?;

        Ok(CompletionResponse {
            id: "scripted".into(),
            model: String::new(),
            content: Some(content),
            finish_reason,
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
        })
    }
}
