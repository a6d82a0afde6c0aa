//! Claude (Anthropic) provider.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use architect_core::{Message, MessageContent, Role, ToolCall};

use crate::error::{LlmError, LlmResult};
use crate::provider::{LlmProvider, ProviderConfig};
use crate::types::{CompletionResponse, FinishReason, StreamChunk, ToolSchema};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeProvider {
    client: Client,
    config: ProviderConfig,
}

impl ClaudeProvider {
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self { client: Client::new(), config }
    }

    fn build_request(&self, messages: &[Message], tools_schema: Option<&[ToolSchema]>, stream: bool) -> Value {
        let system_text = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .filter_map(Message::text)
            .collect::<Vec<_>>()
            .join("\n\n");

        let api_messages: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(Self::convert_message)
            .collect();

        let mut request = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": api_messages,
            "stream": stream,
        });

        if !system_text.is_empty() {
            request["system"] = if self.config.prompt_caching {
                serde_json::json!([{ "type": "text", "text": system_text, "cache_control": { "type": "ephemeral" } }])
            } else {
                Value::String(system_text)
            };
        }

        if let Some(tools) = tools_schema
            && !tools.is_empty()
        {
            let api_tools: Vec<Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.argument_schema,
                    })
                })
                .collect();
            request["tools"] = Value::Array(api_tools);
        }

        request
    }

    fn convert_message(message: &Message) -> Value {
        match &message.content {
            MessageContent::Text(text) => serde_json::json!({
                "role": if message.role == Role::Assistant { "assistant" } else { "user" },
                "content": text,
            }),
            MessageContent::ToolCalls(calls) => {
                let content: Vec<Value> = calls
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "type": "tool_use",
                            "id": c.id,
                            "name": c.name,
                            "input": c.arguments,
                        })
                    })
                    .collect();
                serde_json::json!({ "role": "assistant", "content": content })
            }
            MessageContent::ToolOutput(out) => serde_json::json!({
                "role": "user",
                "content": [{ "type": "tool_result", "tool_use_id": out.call_id, "content": out.text }],
            }),
        }
    }

    fn auth_headers(&self) -> LlmResult<(reqwest::header::HeaderValue, &'static str)> {
        if self.config.api_key.is_empty() {
            return Err(LlmError::ApiKeyNotConfigured { provider: "claude".to_string() });
        }
        let mut header = reqwest::header::HeaderValue::try_from(&self.config.api_key)
            .map_err(|e| LlmError::ConfigError(format!("invalid API key characters: {e}")))?;
        header.set_sensitive(true);
        Ok((header, ANTHROPIC_VERSION))
    }

    fn map_http_error(status: reqwest::StatusCode, body: &str) -> LlmError {
        error!(status = %status, body = %body, "Claude API error");
        match status.as_u16() {
            429 => LlmError::RateLimitExceeded { retry_after_secs: 60 },
            503 | 502 | 500 => LlmError::ServiceUnavailable(format!("status {status}: {body}")),
            400 | 422 => LlmError::MalformedRequest(format!("status {status}: {body}")),
            401 | 403 => LlmError::ApiKeyNotConfigured { provider: "claude".to_string() },
            _ => LlmError::ApiRequestFailed(format!("status {status}: {body}")),
        }
    }

    fn parse_non_streaming_response(response: &ApiResponse) -> CompletionResponse {
        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for block in &response.content {
            match block {
                ContentBlock::Text { text } => content.push_str(text),
                ContentBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall { id: id.clone(), name: name.clone(), arguments: input.clone() });
                }
            }
        }

        CompletionResponse {
            content,
            tool_calls,
            finish_reason: map_stop_reason(response.stop_reason.as_deref()),
            usage: architect_cost::Usage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
                cached_input_tokens: response.usage.cache_read_input_tokens.unwrap_or(0),
            },
        }
    }
}

fn map_stop_reason(stop_reason: Option<&str>) -> FinishReason {
    match stop_reason {
        Some("max_tokens") => FinishReason::MaxTokens,
        Some("tool_use") => FinishReason::ToolUse,
        Some("stop_sequence") => FinishReason::StopSequence,
        _ => FinishReason::EndTurn,
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    fn name(&self) -> &str {
        "Anthropic Claude"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn max_context_tokens(&self) -> usize {
        self.config.context_window.unwrap_or(200_000)
    }

    async fn completion(
        &self,
        messages: &[Message],
        tools_schema: Option<&[ToolSchema]>,
        stream_callback: Option<&mut crate::types::StreamCallback<'_>>,
    ) -> LlmResult<CompletionResponse> {
        let (api_key_header, version) = self.auth_headers()?;
        let url = self.config.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL);

        match stream_callback {
            None => {
                let request_body = self.build_request(messages, tools_schema, false);
                debug!(model = self.config.model, "sending Claude request");

                let response = self
                    .client
                    .post(url)
                    .header("x-api-key", api_key_header)
                    .header("anthropic-version", version)
                    .header("content-type", "application/json")
                    .json(&request_body)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Self::map_http_error(status, &body));
                }

                let api_response: ApiResponse =
                    response.json().await.map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
                Ok(Self::parse_non_streaming_response(&api_response))
            }
            Some(callback) => {
                let request_body = self.build_request(messages, tools_schema, true);
                debug!(model = self.config.model, "starting Claude stream");

                let response = self
                    .client
                    .post(url)
                    .header("x-api-key", api_key_header)
                    .header("anthropic-version", version)
                    .header("content-type", "application/json")
                    .json(&request_body)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Self::map_http_error(status, &body));
                }

                run_stream(response, callback).await
            }
        }
    }
}

/// Consume the SSE byte stream, forwarding each event to `callback` and
/// accumulating the final [`CompletionResponse`].
async fn run_stream(
    response: reqwest::Response,
    callback: &mut crate::types::StreamCallback<'_>,
) -> LlmResult<CompletionResponse> {
    let mut bytes_stream = response.bytes_stream();
    let mut buffer = String::new();
    let mut content = String::new();
    let mut tool_accs: HashMap<usize, ToolAccumulator> = HashMap::new();
    let mut order: Vec<usize> = Vec::new();
    let mut usage = architect_cost::Usage::default();
    let mut finish_reason = FinishReason::EndTurn;

    while let Some(chunk) = bytes_stream.next().await {
        let chunk = chunk.map_err(LlmError::from)?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(event_end) = buffer.find("\n\n") {
            let event_data = buffer[..event_end].to_string();
            let rest_start = event_end + 2;
            buffer = buffer[rest_start..].to_string();

            for line in event_data.lines() {
                let Some(data) = line.strip_prefix("data: ") else { continue };
                if data == "[DONE]" {
                    continue;
                }
                let Ok(event) = serde_json::from_str::<StreamingEvent>(data) else { continue };
                handle_event(event, &mut content, &mut tool_accs, &mut order, &mut usage, &mut finish_reason, callback);
            }
        }
    }

    let tool_calls = order
        .into_iter()
        .filter_map(|index| tool_accs.remove(&index))
        .map(|acc| ToolCall {
            id: acc.id,
            name: acc.name,
            arguments: serde_json::from_str(&acc.args_json).unwrap_or(Value::Null),
        })
        .collect();

    Ok(CompletionResponse { content, tool_calls, finish_reason, usage })
}

struct ToolAccumulator {
    id: String,
    name: String,
    args_json: String,
}

#[allow(clippy::too_many_arguments)]
fn handle_event(
    event: StreamingEvent,
    content: &mut String,
    tool_accs: &mut HashMap<usize, ToolAccumulator>,
    order: &mut Vec<usize>,
    usage: &mut architect_cost::Usage,
    finish_reason: &mut FinishReason,
    callback: &mut crate::types::StreamCallback<'_>,
) {
    match event {
        StreamingEvent::MessageStart { message } => {
            if let Some(input_tokens) = message.get("usage").and_then(|u| u.get("input_tokens")).and_then(Value::as_u64) {
                usage.input_tokens = input_tokens as usize;
            }
            if let Some(cached) = message
                .get("usage")
                .and_then(|u| u.get("cache_read_input_tokens"))
                .and_then(Value::as_u64)
            {
                usage.cached_input_tokens = cached as usize;
            }
        }
        StreamingEvent::ContentBlockStart { index, content_block } => {
            if let ContentBlock::ToolUse { id, name, .. } = content_block {
                order.push(index);
                callback(StreamChunk::ToolCallStart { index, id: id.clone(), name: name.clone() });
                tool_accs.insert(index, ToolAccumulator { id, name, args_json: String::new() });
            }
        }
        StreamingEvent::ContentBlockDelta { index, delta } => match delta {
            Delta::TextDelta { text } => {
                content.push_str(&text);
                callback(StreamChunk::TextDelta(text));
            }
            Delta::InputJsonDelta { partial_json } => {
                if let Some(acc) = tool_accs.get_mut(&index) {
                    acc.args_json.push_str(&partial_json);
                }
                callback(StreamChunk::ToolCallDelta { index, args_delta: partial_json });
            }
        },
        StreamingEvent::ContentBlockStop { index } => {
            callback(StreamChunk::ToolCallEnd { index });
        }
        StreamingEvent::MessageDelta { delta, usage: delta_usage } => {
            if let Some(stop_reason) = delta.get("stop_reason").and_then(Value::as_str) {
                *finish_reason = map_stop_reason(Some(stop_reason));
            }
            if let Some(u) = delta_usage {
                usage.output_tokens = u.output_tokens;
                callback(StreamChunk::Usage(*usage));
            }
        }
        StreamingEvent::MessageStop => {
            callback(StreamChunk::Done { finish_reason: *finish_reason });
        }
        StreamingEvent::Ping | StreamingEvent::Error { .. } => {}
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: usize,
    output_tokens: usize,
    #[serde(default)]
    cache_read_input_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    ToolUse { id: String, name: String, #[serde(default)] input: Value },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[allow(dead_code)]
enum StreamingEvent {
    MessageStart { message: Value },
    ContentBlockStart { index: usize, content_block: ContentBlock },
    ContentBlockDelta { index: usize, delta: Delta },
    ContentBlockStop { index: usize },
    MessageDelta { delta: Value, usage: Option<DeltaUsage> },
    MessageStop,
    Ping,
    Error { error: Value },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta { text: String },
    InputJsonDelta { partial_json: String },
}

#[derive(Debug, Deserialize)]
struct DeltaUsage {
    output_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_fails_fast() {
        let config = ProviderConfig::new("", "claude-sonnet-4");
        let provider = ClaudeProvider::new(config);
        let err = provider.completion(&[], None, None).await.unwrap_err();
        assert!(matches!(err, LlmError::ApiKeyNotConfigured { .. }));
    }

    #[test]
    fn build_request_carries_model_and_system() {
        let config = ProviderConfig::new("test-key", "claude-sonnet-4");
        let provider = ClaudeProvider::new(config);
        let messages = vec![Message::system("be helpful"), Message::user("hi")];
        let request = provider.build_request(&messages, None, false);
        assert_eq!(request["model"], "claude-sonnet-4");
        assert_eq!(request["system"], "be helpful");
        assert!(!request["stream"].as_bool().unwrap());
    }

    #[test]
    fn prompt_caching_wraps_system_with_cache_control() {
        let config = ProviderConfig::new("test-key", "claude-sonnet-4").with_prompt_caching(true);
        let provider = ClaudeProvider::new(config);
        let messages = vec![Message::system("be helpful")];
        let request = provider.build_request(&messages, None, false);
        assert_eq!(request["system"][0]["cache_control"]["type"], "ephemeral");
    }

    #[test]
    fn convert_message_roundtrips_text() {
        let message = Message::user("hello");
        let converted = ClaudeProvider::convert_message(&message);
        assert_eq!(converted["role"], "user");
        assert_eq!(converted["content"], "hello");
    }

    #[test]
    fn stop_reason_maps_tool_use() {
        assert_eq!(map_stop_reason(Some("tool_use")), FinishReason::ToolUse);
        assert_eq!(map_stop_reason(Some("max_tokens")), FinishReason::MaxTokens);
        assert_eq!(map_stop_reason(None), FinishReason::EndTurn);
    }
}
