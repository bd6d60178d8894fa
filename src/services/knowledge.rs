//! Taught-knowledge store
//!
//! Question/answer pairs the users teach through the manual learning flow.
//! The persistence format is the collaborator's business; the core only needs
//! list + save.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::error::AssistantError;

/// One taught pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualEntry {
    pub question: String,
    pub answer: String,
}

/// Knowledge persistence contract
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    async fn list_manual_entries(&self, limit: usize) -> Result<Vec<ManualEntry>, AssistantError>;

    /// Persists a pair and returns the confirmation text shown to the user
    async fn save_manual_entry(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<String, AssistantError>;
}

/// In-memory store backing the CLI and the tests
#[derive(Default)]
pub struct InMemoryKnowledge {
    entries: RwLock<Vec<ManualEntry>>,
}

impl InMemoryKnowledge {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledge {
    async fn list_manual_entries(&self, limit: usize) -> Result<Vec<ManualEntry>, AssistantError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }

    async fn save_manual_entry(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<String, AssistantError> {
        let mut entries = self.entries.write().await;
        entries.push(ManualEntry {
            question: question.to_string(),
            answer: answer.to_string(),
        });
        Ok(format!(
            "✅ Aprendi! Quando perguntarem \"{}\" vou responder \"{}\".",
            question, answer
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saves_and_lists_latest_first() {
        let store = InMemoryKnowledge::new();
        store.save_manual_entry("q1", "a1").await.unwrap();
        let confirmation = store.save_manual_entry("q2", "a2").await.unwrap();
        assert!(confirmation.contains("q2"));

        let entries = store.list_manual_entries(1).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].question, "q2");
    }
}
