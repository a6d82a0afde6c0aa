//! Bridges the Context Manager's [`Summarizer`] trait to a real LLM call.
//! Lives here rather than in `architect-context` because that crate sits
//! below `architect-llm` in the dependency graph and must not depend on it.

use std::sync::Arc;

use architect_context::Summarizer;
use architect_core::Message;
use architect_llm::{LlmAdapter, LlmProvider};
use async_trait::async_trait;

/// Summarizes old conversation turns via a one-off, tool-free completion.
pub struct LlmSummarizer<P> {
    adapter: Arc<LlmAdapter<P>>,
}

impl<P: LlmProvider> LlmSummarizer<P> {
    #[must_use]
    pub fn new(adapter: Arc<LlmAdapter<P>>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl<P: LlmProvider + Send + Sync> Summarizer for LlmSummarizer<P> {
    async fn summarize(&self, transcript: &str) -> Result<String, String> {
        let prompt = format!(
            "Summarize the following conversation excerpt in 200 words or \
             fewer. Preserve concrete facts: file paths touched, decisions \
             made, and outstanding issues.\n\n{transcript}"
        );
        let messages = vec![Message::user(prompt)];
        self.adapter
            .completion(&messages, None, None)
            .await
            .map(|response| response.content)
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_cost::Usage;
    use architect_llm::{CompletionResponse, FinishReason, StreamCallback, ToolSchema};
    use architect_llm::LlmResult;

    struct StubProvider;

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }
        fn model(&self) -> &str {
            "stub-model"
        }
        fn max_context_tokens(&self) -> usize {
            10_000
        }
        async fn completion(
            &self,
            _messages: &[Message],
            _tools_schema: Option<&[ToolSchema]>,
            _stream_callback: Option<&mut StreamCallback<'_>>,
        ) -> LlmResult<CompletionResponse> {
            Ok(CompletionResponse {
                content: "a short recap".to_string(),
                tool_calls: vec![],
                finish_reason: FinishReason::EndTurn,
                usage: Usage::new(10, 5),
            })
        }
    }

    #[tokio::test]
    async fn summarize_returns_the_provider_content() {
        let adapter = Arc::new(LlmAdapter::new(StubProvider, 0));
        let summarizer = LlmSummarizer::new(adapter);
        let summary = summarizer.summarize("a long transcript").await.unwrap();
        assert_eq!(summary, "a short recap");
    }
}
