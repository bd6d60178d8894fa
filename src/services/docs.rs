//! Document-store service
//!
//! Listing and search against the corporate document store. The concrete
//! remote client lives outside this crate; readiness is reported through the
//! presence of its required configuration (auth token and root identifier) so
//! the file handler can answer with a precise configuration error instead of
//! failing mid-call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::error::AssistantError;

/// File record as returned by the store; several candidate URL fields, the
/// first valid one wins when rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    pub web_url: Option<String>,
    pub url: Option<String>,
    pub server_url: Option<String>,
    pub id: Option<String>,
    /// ISO-8601 modification timestamp
    pub modified: Option<String>,
}

/// Whether the store has the configuration it needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    MissingToken,
    MissingRoot,
}

/// Document-store contract
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn readiness(&self) -> Readiness;

    async fn list_recent_files(&self, limit: usize) -> Result<Vec<RemoteFile>, AssistantError>;

    /// Substring/term search; an empty result is a defined outcome, not an
    /// error
    async fn search_files(&self, term: &str) -> Result<Vec<RemoteFile>, AssistantError>;
}

/// In-memory store for the CLI and tests: newest files first, lowercase
/// substring search on the name
#[derive(Default)]
pub struct InMemoryDocumentStore {
    files: RwLock<Vec<RemoteFile>>,
}

impl InMemoryDocumentStore {
    pub fn new(files: Vec<RemoteFile>) -> Self {
        Self {
            files: RwLock::new(files),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn readiness(&self) -> Readiness {
        Readiness::Ready
    }

    async fn list_recent_files(&self, limit: usize) -> Result<Vec<RemoteFile>, AssistantError> {
        let files = self.files.read().await;
        Ok(files.iter().take(limit).cloned().collect())
    }

    async fn search_files(&self, term: &str) -> Result<Vec<RemoteFile>, AssistantError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let files = self.files.read().await;
        Ok(files
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> RemoteFile {
        RemoteFile {
            name: name.to_string(),
            web_url: Some(format!("https://docs.example.com/{name}")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let store = InMemoryDocumentStore::new(vec![file("Relatorio_Anual.pdf"), file("ata.docx")]);
        let found = store.search_files("relatorio").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Relatorio_Anual.pdf");
    }

    #[tokio::test]
    async fn list_respects_limit() {
        let store = InMemoryDocumentStore::new(vec![file("a.pdf"), file("b.pdf"), file("c.pdf")]);
        assert_eq!(store.list_recent_files(2).await.unwrap().len(), 2);
    }
}
