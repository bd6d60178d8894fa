//! Conversation history
//!
//! Records each (user message, reply) pair and renders a recent-conversation
//! summary for prompt construction. Keeps the last N turns per user, pruning
//! the oldest on overflow.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// History contract: the orchestrator logs every exchange here and the
/// general handler reads a formatted excerpt back for the LLM prompt
#[async_trait]
pub trait ConversationHistory: Send + Sync {
    async fn add_interaction(&self, user_id: &str, message: &str, reply: &str);

    /// Recent turns rendered as prompt text; empty string when none
    async fn format_for_prompt(&self, user_id: &str) -> String;
}

/// In-memory history: last `max_turns` (message, reply) pairs per user
pub struct InMemoryHistory {
    turns: RwLock<HashMap<String, Vec<(String, String)>>>,
    max_turns: usize,
}

impl InMemoryHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: RwLock::new(HashMap::new()),
            max_turns: max_turns.max(1),
        }
    }
}

#[async_trait]
impl ConversationHistory for InMemoryHistory {
    async fn add_interaction(&self, user_id: &str, message: &str, reply: &str) {
        let mut turns = self.turns.write().await;
        let entries = turns.entry(user_id.to_string()).or_default();
        entries.push((message.to_string(), reply.to_string()));
        if entries.len() > self.max_turns {
            let drop = entries.len() - self.max_turns;
            entries.drain(..drop);
        }
    }

    async fn format_for_prompt(&self, user_id: &str) -> String {
        let turns = self.turns.read().await;
        let Some(entries) = turns.get(user_id) else {
            return String::new();
        };
        let mut lines = vec!["Conversa recente:".to_string()];
        for (message, reply) in entries {
            lines.push(format!("Usuário: {}", message));
            lines.push(format!("Assistente: {}", reply));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_and_formats_turns() {
        let history = InMemoryHistory::new(10);
        history.add_interaction("u1", "oi", "Olá!").await;

        let prompt = history.format_for_prompt("u1").await;
        assert!(prompt.contains("Usuário: oi"));
        assert!(prompt.contains("Assistente: Olá!"));
        assert_eq!(history.format_for_prompt("u2").await, "");
    }

    #[tokio::test]
    async fn prunes_oldest_turns() {
        let history = InMemoryHistory::new(2);
        history.add_interaction("u1", "um", "1").await;
        history.add_interaction("u1", "dois", "2").await;
        history.add_interaction("u1", "três", "3").await;

        let prompt = history.format_for_prompt("u1").await;
        assert!(!prompt.contains("Usuário: um"));
        assert!(prompt.contains("Usuário: dois"));
        assert!(prompt.contains("Usuário: três"));
    }
}
