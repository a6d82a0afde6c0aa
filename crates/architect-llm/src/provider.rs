//! The raw per-provider interface. A single attempt, no retries, no
//! caching — those are layered on top by [`crate::adapter::LlmAdapter`].

use async_trait::async_trait;

use architect_core::Message;

use crate::error::LlmResult;
use crate::types::{CompletionResponse, StreamCallback, ToolSchema};

/// One language-model backend (Claude, an OpenAI-compatible endpoint, ...).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    fn max_context_tokens(&self) -> usize;

    /// Run one completion. `stream_callback`, when present, receives chunks
    /// as they arrive; the returned [`CompletionResponse`] is always the
    /// fully-accumulated result either way.
    async fn completion(
        &self,
        messages: &[Message],
        tools_schema: Option<&[ToolSchema]>,
        stream_callback: Option<&mut StreamCallback<'_>>,
    ) -> LlmResult<CompletionResponse>;
}

#[async_trait]
impl LlmProvider for Box<dyn LlmProvider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    fn max_context_tokens(&self) -> usize {
        (**self).max_context_tokens()
    }

    async fn completion(
        &self,
        messages: &[Message],
        tools_schema: Option<&[ToolSchema]>,
        stream_callback: Option<&mut StreamCallback<'_>>,
    ) -> LlmResult<CompletionResponse> {
        (**self).completion(messages, tools_schema, stream_callback).await
    }
}

/// Construction parameters shared by every provider.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f64,
    pub base_url: Option<String>,
    pub context_window: Option<usize>,
    /// Opt-in: mark the system message with a provider cache-control
    /// attribute. Providers that don't recognize it ignore it.
    pub prompt_caching: bool,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("has_api_key", &!self.api_key.is_empty())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("has_base_url", &self.base_url.is_some())
            .field("context_window", &self.context_window)
            .field("prompt_caching", &self.prompt_caching)
            .finish()
    }
}

impl ProviderConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 4_096,
            temperature: 0.7,
            base_url: None,
            context_window: None,
            prompt_caching: false,
        }
    }

    #[must_use]
    pub fn max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = temp.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn context_window(mut self, size: usize) -> Self {
        self.context_window = Some(size);
        self
    }

    #[must_use]
    pub fn with_prompt_caching(mut self, enabled: bool) -> Self {
        self.prompt_caching = enabled;
        self
    }
}
