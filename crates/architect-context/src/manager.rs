//! The three-level Context Manager: applied, in order, on every LLM call
//! after the first.

use architect_core::{Message, Role};

use crate::config::ContextConfig;
use crate::estimate::{estimate_messages, estimate_text};
use crate::summarizer::Summarizer;
use crate::truncate::truncate_tool_output;

/// What happened during one [`ContextManager::run`] pass.
#[derive(Debug, Clone, Default)]
pub struct ContextRunOutcome {
    /// Level 2 fired and replaced this many messages with a summary.
    pub compressed_messages: usize,
    /// Level 2's summary came from the mechanical fallback, not the LLM.
    pub compression_fell_back: bool,
    /// Level 3 fired and dropped this many messages.
    pub trimmed_messages: usize,
}

impl ContextRunOutcome {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.compressed_messages > 0 || self.trimmed_messages > 0
    }
}

/// Applies tool-output truncation, old-turn compression, and a hard window
/// cap to a conversation.
#[derive(Debug, Clone)]
pub struct ContextManager {
    config: ContextConfig,
}

impl ContextManager {
    #[must_use]
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Level 1: truncate a single tool result before it is appended.
    #[must_use]
    pub fn apply_tool_truncation(&self, text: &str) -> String {
        truncate_tool_output(text, self.config.max_tool_result_tokens)
    }

    /// Run all three levels in order. `summarizer` is consulted only if
    /// Level 2 triggers.
    pub async fn run(&self, messages: &mut Vec<Message>, summarizer: &dyn Summarizer) -> ContextRunOutcome {
        let mut outcome = ContextRunOutcome::default();

        if self.should_compress(messages) {
            let (compressed, fell_back) = self.compress(messages, summarizer).await;
            outcome.compressed_messages = compressed;
            outcome.compression_fell_back = fell_back;
        }

        outcome.trimmed_messages = self.enforce_window(messages);
        outcome
    }

    fn should_compress(&self, messages: &[Message]) -> bool {
        let tool_exchange_count = messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .count();
        if tool_exchange_count <= self.config.summarize_after_steps {
            return false;
        }
        let estimated = estimate_messages(messages);
        let threshold = (self.config.compress_threshold * self.config.max_context_tokens as f64) as usize;
        estimated > threshold
    }

    /// Level 2. Returns `(messages_replaced, fell_back_to_mechanical)`.
    async fn compress(&self, messages: &mut Vec<Message>, summarizer: &dyn Summarizer) -> (usize, bool) {
        let pinned = pinned_head_count(messages);
        let keep_verbatim = self.config.keep_recent_steps.saturating_mul(3);
        let old_end = messages.len().saturating_sub(keep_verbatim);

        if old_end <= pinned {
            return (0, false);
        }

        let old: Vec<Message> = messages.splice(pinned..old_end, std::iter::empty()).collect();
        let count = old.len();

        let (summary_text, fell_back) = match summarizer.summarize(&format_transcript(&old)).await {
            Ok(summary) => (summary, false),
            Err(reason) => {
                tracing::warn!(reason = %reason, "context summarizer failed, using mechanical fallback");
                (mechanical_summary(&old), true)
            }
        };

        let summary_message = Message::assistant(format!(
            "[compressed summary of {count} earlier messages]\n{summary_text}"
        ));
        messages.insert(pinned, summary_message);

        (count, fell_back)
    }

    /// Level 3. Returns the number of messages dropped. `max_context_tokens
    /// == 0` disables the window cap entirely.
    fn enforce_window(&self, messages: &mut Vec<Message>) -> usize {
        if self.config.max_context_tokens == 0 {
            return 0;
        }

        let pinned = pinned_head_count(messages);
        let mut dropped = 0usize;

        while estimate_messages(messages) > self.config.max_context_tokens && messages.len() >= pinned + 2 {
            messages.remove(pinned);
            messages.remove(pinned);
            dropped += 2;
            tracing::warn!(dropped_so_far = dropped, "context window trim: dropped oldest non-pinned pair");
        }

        dropped
    }

    /// True when estimated tokens (conversation plus the serialized tool
    /// schema sent on every call) exceed 95% of the hard cap even after
    /// compression — signals the Agent Loop to force a graceful close.
    /// `max_context_tokens == 0` disables the window entirely, so nothing
    /// can be critically full against it.
    #[must_use]
    pub fn is_critically_full(&self, messages: &[Message], tool_schema_json: &str) -> bool {
        if self.config.max_context_tokens == 0 {
            return false;
        }
        let total = estimate_messages(messages) + estimate_text(tool_schema_json);
        let ceiling = (self.config.max_context_tokens as f64 * 0.95) as usize;
        total > ceiling
    }
}

/// How many leading messages are pinned: the leading `system` message, plus
/// the first `user` message that follows it. Never compressed or trimmed.
fn pinned_head_count(messages: &[Message]) -> usize {
    let mut count = 0;
    if messages.first().is_some_and(|m| m.role == Role::System) {
        count += 1;
    }
    if messages.get(count).is_some_and(|m| m.role == Role::User) {
        count += 1;
    }
    count
}

fn format_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let role = role_label(m.role);
            let text = match m.text() {
                Some(t) => t.to_string(),
                None => match m.tool_calls() {
                    Some(calls) => {
                        let names: Vec<_> = calls.iter().map(|c| c.name.clone()).collect();
                        format!("[tool calls: {}]", names.join(", "))
                    }
                    None => m
                        .tool_output_ref()
                        .map(|out| format!("[tool result: {}]", truncate_tool_output(&out.text, 80)))
                        .unwrap_or_default(),
                },
            };
            format!("{role}: {text}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::System => "System",
        Role::User => "User",
        Role::Assistant => "Assistant",
        Role::Tool => "Tool",
    }
}

/// Fallback when the LLM summarizer call fails: a concatenated list of
/// prior tool names with a rough success flag, truncated to the last 30.
fn mechanical_summary(old: &[Message]) -> String {
    let mut entries = Vec::new();
    for message in old {
        if let Some(calls) = message.tool_calls() {
            for call in calls {
                entries.push((call.name.clone(), true));
            }
        }
    }

    for message in old {
        if let Some(out) = message.tool_output_ref() {
            if let Some(last) = entries.last_mut() {
                last.1 = !looks_like_failure(&out.text);
            }
        }
    }

    let start = entries.len().saturating_sub(30);
    entries[start..]
        .iter()
        .map(|(name, ok)| format!("{name}:{}", if *ok { "ok" } else { "fail" }))
        .collect::<Vec<_>>()
        .join(", ")
}

fn looks_like_failure(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.starts_with("error") || lower.contains("blocked by guardrails") || lower.contains("denied") || lower.contains("failed")
}
