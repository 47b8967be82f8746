//! The question -> SQL -> result boundary.
//!
//! `SqlCapability` is the narrow interface the runner talks to. The LLM-backed
//! implementation asks the model for SQL, executes it, and feeds execution
//! errors back to the model for a bounded number of repairs.

use crate::config::AgentConfig;
use crate::executor::QueryExecutor;
use crate::intent::Intent;
use crate::prompt;
use crate::schema::DatabaseSchema;
use crate::sql;
use crate::table::ResultTable;
use std::time::Duration;
use storefront_error::{Error, ErrorKind, Result};
use storefront_llm::{
    ChatMessage, CompletionRequest, FinishReason, LlmConfig, LlmProvider, ProviderError, UsageTracker,
};
use tracing::{debug, info, warn};

/// SQL plus the rows it produced
#[derive(Debug, Clone)]
pub struct Answer {
    pub sql: String,
    pub table: ResultTable,
    /// Model round trips used (0 when no model was involved)
    pub attempts: u32,
}

/// Turns a question into an executed query.
#[allow(async_fn_in_trait)]
pub trait SqlCapability {
    async fn answer(
        &mut self,
        question: &str,
        schema: &DatabaseSchema,
        executor: &QueryExecutor,
    ) -> Result<Answer>;

    /// Token usage so far, if the capability calls a model
    fn usage(&self) -> Option<&UsageTracker> {
        None
    }
}

/// Map a provider failure into the crate error, keeping retry status.
pub fn provider_error(err: ProviderError) -> Error {
    let retryable = err.is_retryable();
    let kind = match &err {
        ProviderError::Network(_) => ErrorKind::NetworkFailed,
        ProviderError::RateLimited { .. } => ErrorKind::RateLimited,
        ProviderError::AuthenticationFailed => ErrorKind::AuthenticationFailed,
        ProviderError::Api { status, .. } if *status >= 500 => ErrorKind::ProviderUnavailable,
        ProviderError::Parse(_) => ErrorKind::ParseFailed,
        ProviderError::ModelNotFound(_) => ErrorKind::ConfigInvalid,
        _ => ErrorKind::InferenceFailed,
    };
    let error = Error::new(kind, err.to_string()).with_operation("llm::complete");
    if retryable {
        error.temporary()
    } else {
        error
    }
}

/// LLM-backed capability with query repair.
pub struct LlmSqlAgent<P: LlmProvider> {
    provider: P,
    model: Option<String>,
    temperature: f32,
    max_tokens: usize,
    config: AgentConfig,
    usage: UsageTracker,
}

impl<P: LlmProvider> LlmSqlAgent<P> {
    pub fn new(provider: P, config: AgentConfig) -> Self {
        Self {
            provider,
            model: None,
            temperature: 0.0,
            max_tokens: 1024,
            config,
            usage: UsageTracker::new(),
        }
    }

    /// Apply model and sampling settings from the `[llm]` section.
    pub fn with_llm_config(mut self, llm: &LlmConfig) -> Self {
        self.model = llm.model.clone();
        self.temperature = llm.temperature;
        self.max_tokens = llm.max_tokens;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// One completion, retrying retryable provider failures with linear backoff.
    ///
    /// A rate limit that names a retry delay waits at least that long.
    async fn complete_with_retry(&mut self, messages: &[ChatMessage]) -> Result<String> {
        let mut attempt = 0;
        loop {
            let mut request = CompletionRequest::new(messages.to_vec())
                .with_temperature(self.temperature)
                .with_max_tokens(self.max_tokens);
            if let Some(model) = &self.model {
                request = request.with_model(model.clone());
            }

            match self.provider.complete(request).await {
                Ok(response) => {
                    let model = if response.model.is_empty() {
                        self.provider.default_model().to_string()
                    } else {
                        response.model.clone()
                    };
                    self.usage.track(&model, &response.usage);
                    if response.finish_reason == FinishReason::Length {
                        return Err(Error::inference_failed("reply cut off at the token limit")
                            .with_operation("llm::complete")
                            .with_context("max_tokens", self.max_tokens.to_string()));
                    }
                    return response.content.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
                        Error::no_query_produced("model returned no content").with_operation("llm::complete")
                    });
                }
                Err(err) if err.is_retryable() && attempt < self.config.provider_retries => {
                    attempt += 1;
                    let backoff = self.config.retry_backoff_ms.saturating_mul(u64::from(attempt));
                    let wait_ms = match &err {
                        ProviderError::RateLimited {
                            retry_after: Some(secs),
                        } => backoff.max(secs.saturating_mul(1000)),
                        _ => backoff,
                    };
                    warn!(error = %err, attempt, wait_ms, "provider call failed, retrying");
                    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                }
                Err(err) => {
                    let error = provider_error(err).with_context("provider", self.provider.name().to_string());
                    return Err(if attempt > 0 { error.persist() } else { error });
                }
            }
        }
    }
}

impl<P: LlmProvider> SqlCapability for LlmSqlAgent<P> {
    async fn answer(
        &mut self,
        question: &str,
        schema: &DatabaseSchema,
        executor: &QueryExecutor,
    ) -> Result<Answer> {
        let intent = Intent::classify(question);
        info!(%intent, provider = self.provider.name(), "asking model for SQL");

        let mut messages = vec![
            ChatMessage::system(prompt::system_prompt(schema, intent)),
            ChatMessage::user(prompt::user_prompt(question)),
        ];

        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let reply = self.complete_with_retry(&messages).await?;
            let query = sql::extract_sql(&reply)?;
            debug!(attempt, sql = %query, "model proposed query");

            match executor.execute(&query, self.config.max_rows) {
                Ok(table) => {
                    info!(attempt, rows = table.row_count(), "query succeeded");
                    return Ok(Answer {
                        sql: query,
                        table,
                        attempts: attempt,
                    });
                }
                Err(err) if err.kind() == ErrorKind::QueryFailed => {
                    warn!(attempt, error = %err.message(), "query failed, asking for a repair");
                    messages.push(ChatMessage::assistant(reply));
                    messages.push(ChatMessage::user(prompt::repair_prompt(&query, err.message())));
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        let err = last_error.unwrap_or_else(|| Error::query_failed("no attempt was made", ""));
        Err(err.with_context("attempts", max_attempts.to_string()))
    }

    fn usage(&self) -> Option<&UsageTracker> {
        Some(&self.usage)
    }
}

/// Runs a caller-supplied query without a model.
pub struct DirectSql {
    sql: String,
    max_rows: usize,
}

impl DirectSql {
    pub fn new(sql: impl Into<String>, max_rows: usize) -> Self {
        Self {
            sql: sql.into(),
            max_rows,
        }
    }
}

impl SqlCapability for DirectSql {
    async fn answer(
        &mut self,
        _question: &str,
        _schema: &DatabaseSchema,
        executor: &QueryExecutor,
    ) -> Result<Answer> {
        let query = sql::sanitize(&self.sql)?;
        let table = executor.execute(&query, self.max_rows)?;
        Ok(Answer {
            sql: query,
            table,
            attempts: 0,
        })
    }
}
