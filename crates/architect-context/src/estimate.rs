//! Token estimation: `chars / 4`. Approximate but sufficient for the
//! Context Manager's compression decisions; precise accounting is not
//! attempted here (see the Cost Tracker for usage-reported token counts).

use architect_core::Message;

/// Estimate the token count of a single piece of text.
#[must_use]
pub fn estimate_text(text: &str) -> usize {
    text.len() / 4
}

/// Estimate the total token count of a message sequence.
#[must_use]
pub fn estimate_messages(messages: &[Message]) -> usize {
    messages.iter().map(Message::estimated_tokens).sum()
}
