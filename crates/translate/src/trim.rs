//! Context trimming: cap conversation length per model family.

use llmux_types::ChatMessage;

/// Message budgets by model-name substring, most specific first. The first
/// matching entry wins, so `gpt-4-32k` must precede `gpt-4`.
const BUDGETS: &[(&str, usize)] = &[
    ("gpt-5", 50),
    ("gpt-4-32k", 40),
    ("gpt-4", 30),
    ("gpt-3.5", 25),
    ("claude", 35),
    ("gemini-1.5", 40),
];

/// Budget for models that match no entry in the table.
pub const DEFAULT_BUDGET: usize = 20;

/// Message budget for a model name (case-insensitive substring match).
#[must_use]
pub fn message_budget(model: &str) -> usize {
    let model = model.to_ascii_lowercase();
    BUDGETS
        .iter()
        .find(|(marker, _)| model.contains(marker))
        .map_or(DEFAULT_BUDGET, |(_, budget)| *budget)
}

/// Trim a conversation to the model's message budget.
///
/// Every system message survives; the remaining slots go to the most
/// recent non-system messages, with at least one non-system message kept
/// even when system messages alone exceed the budget. Relative order is
/// preserved, and a list already within budget comes back untouched.
#[must_use]
pub fn trim_messages(messages: Vec<ChatMessage>, model: &str) -> Vec<ChatMessage> {
    let budget = message_budget(model);
    if messages.len() <= budget {
        return messages;
    }

    let system_count = messages.iter().filter(|m| m.is_system()).count();
    let non_system_count = messages.len() - system_count;
    let keep_non_system = budget
        .saturating_sub(system_count)
        .max(1)
        .min(non_system_count);

    // Oldest non-system messages are the ones dropped.
    let mut to_drop = non_system_count - keep_non_system;
    let mut kept = Vec::with_capacity(messages.len() - to_drop);
    for message in messages {
        if !message.is_system() && to_drop > 0 {
            to_drop -= 1;
            continue;
        }
        kept.push(message);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(system: usize, turns: usize) -> Vec<ChatMessage> {
        let mut messages = Vec::new();
        for i in 0..system {
            messages.push(ChatMessage::text("system", format!("rule {i}")));
        }
        for i in 0..turns {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            messages.push(ChatMessage::text(role, format!("turn {i}")));
        }
        messages
    }

    #[test]
    fn test_budget_table() {
        assert_eq!(message_budget("gpt-5-nano"), 50);
        assert_eq!(message_budget("gpt-4-32k"), 40);
        assert_eq!(message_budget("gpt-4o"), 30);
        assert_eq!(message_budget("gpt-3.5-turbo-16k"), 25);
        assert_eq!(message_budget("claude-3-5-sonnet"), 35);
        assert_eq!(message_budget("gemini-1.5-pro"), 40);
        assert_eq!(message_budget("mistral-large"), DEFAULT_BUDGET);
    }

    #[test]
    fn test_budget_is_case_insensitive() {
        assert_eq!(message_budget("GPT-4-32K"), 40);
        assert_eq!(message_budget("Claude-3-Opus"), 35);
    }

    #[test]
    fn test_within_budget_is_untouched() {
        let messages = conversation(1, 10);
        let trimmed = trim_messages(messages.clone(), "gpt-4o");
        assert_eq!(trimmed, messages);
    }

    #[test]
    fn test_keeps_system_and_most_recent() {
        // 1 system + 25 turns on a 25-message budget: the oldest turn goes.
        let messages = conversation(1, 25);
        let trimmed = trim_messages(messages, "gpt-3.5-turbo");

        assert_eq!(trimmed.len(), 25);
        assert!(trimmed[0].is_system());
        assert_eq!(trimmed[1].content_str(), Some("turn 1"));
        assert_eq!(trimmed[24].content_str(), Some("turn 24"));
        assert!(trimmed.iter().all(|m| m.content_str() != Some("turn 0")));
    }

    #[test]
    fn test_preserves_relative_order() {
        let messages = conversation(2, 30);
        let trimmed = trim_messages(messages, "unknown-model");

        assert_eq!(trimmed.len(), DEFAULT_BUDGET);
        assert!(trimmed[0].is_system());
        assert!(trimmed[1].is_system());
        let turns: Vec<_> = trimmed[2..]
            .iter()
            .filter_map(ChatMessage::content_str)
            .collect();
        let expected: Vec<String> = (12..30).map(|i| format!("turn {i}")).collect();
        assert_eq!(turns, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_interleaved_system_messages_survive_in_place() {
        let mut messages = conversation(0, 6);
        messages.insert(3, ChatMessage::text("system", "mid-conversation rule"));
        let trimmed = trim_messages(messages, "unknown-model");
        // 7 messages under a 20 budget: nothing moves.
        assert_eq!(trimmed[3].content_str(), Some("mid-conversation rule"));
    }

    #[test]
    fn test_at_least_one_non_system_survives() {
        let messages = conversation(25, 3);
        let trimmed = trim_messages(messages, "unknown-model");

        assert_eq!(trimmed.iter().filter(|m| m.is_system()).count(), 25);
        assert_eq!(trimmed.iter().filter(|m| !m.is_system()).count(), 1);
        assert_eq!(trimmed.last().unwrap().content_str(), Some("turn 2"));
    }

    #[test]
    fn test_trim_is_idempotent() {
        let messages = conversation(1, 40);
        let once = trim_messages(messages, "gpt-4o");
        let twice = trim_messages(once.clone(), "gpt-4o");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_conversation() {
        assert!(trim_messages(Vec::new(), "gpt-4o").is_empty());
    }
}
