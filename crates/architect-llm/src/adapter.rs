//! The LLM Adapter (§4.9): wraps a raw [`LlmProvider`] with selective
//! retries and an opt-in local response cache.

use architect_core::Message;

use crate::cache::ResponseCache;
use crate::error::LlmResult;
use crate::provider::LlmProvider;
use crate::retry::with_retries;
use crate::types::{CompletionResponse, StreamCallback, ToolSchema};

/// Adds retries and caching on top of a provider. Construct one per agent
/// run.
pub struct LlmAdapter<P> {
    provider: P,
    retries: u32,
    cache: Option<ResponseCache>,
}

impl<P: LlmProvider> LlmAdapter<P> {
    #[must_use]
    pub fn new(provider: P, retries: u32) -> Self {
        Self { provider, retries, cache: None }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one completion.
    ///
    /// Non-streaming calls are cached (when a cache is configured) and
    /// retried on transient errors. Streaming calls bypass both: a partial
    /// stream has already reached the caller by the time an error could be
    /// classified, so retrying would duplicate output, and caching a
    /// streamed response would defeat the purpose of watching it live.
    pub async fn completion(
        &self,
        messages: &[Message],
        tools_schema: Option<&[ToolSchema]>,
        stream_callback: Option<&mut StreamCallback<'_>>,
    ) -> LlmResult<CompletionResponse> {
        if let Some(callback) = stream_callback {
            return self.provider.completion(messages, tools_schema, Some(callback)).await;
        }

        if let Some(cache) = &self.cache {
            let key = ResponseCache::key_for(messages, tools_schema);
            if let Some(cached) = cache.get(&key).await {
                tracing::debug!(key = %key, "LLM response cache hit");
                return Ok(cached);
            }
        }

        let response = with_retries(self.retries, || self.provider.completion(messages, tools_schema, None)).await?;

        if let Some(cache) = &self.cache {
            let key = ResponseCache::key_for(messages, tools_schema);
            cache.put(&key, &response).await;
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::types::FinishReason;
    use architect_cost::Usage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingProvider {
        calls: Arc<AtomicU32>,
        fail_times: u32,
    }

    #[async_trait]
    impl LlmProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }
        fn model(&self) -> &str {
            "test-model"
        }
        fn max_context_tokens(&self) -> usize {
            100_000
        }

        async fn completion(
            &self,
            _messages: &[Message],
            _tools_schema: Option<&[ToolSchema]>,
            _stream_callback: Option<&mut StreamCallback<'_>>,
        ) -> LlmResult<CompletionResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                return Err(LlmError::Timeout);
            }
            Ok(CompletionResponse {
                content: "ok".to_string(),
                tool_calls: vec![],
                finish_reason: FinishReason::EndTurn,
                usage: Usage::new(1, 1),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let provider = CountingProvider { calls: calls.clone(), fail_times: 2 };
        let adapter = LlmAdapter::new(provider, 3);

        let result = adapter.completion(&[Message::user("hi")], None, None).await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cache_hit_skips_the_provider() {
        let tmp = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicU32::new(0));
        let provider = CountingProvider { calls: calls.clone(), fail_times: 0 };
        let adapter = LlmAdapter::new(provider, 0)
            .with_cache(ResponseCache::new(tmp.path(), Duration::from_secs(3_600)));

        let messages = vec![Message::user("hi")];
        adapter.completion(&messages, None, None).await.unwrap();
        adapter.completion(&messages, None, None).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
