//! Top-level assistant
//!
//! Owns the classifier, the session store, both TTL caches and the router,
//! and wires the handlers over injected collaborator trait objects. `respond`
//! is the single entry point and the failure boundary: whatever a handler
//! returns as Err becomes a logged incident plus a generic apology carrying
//! the incident id, never the underlying detail.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use crate::config::AppConfig;
use crate::core::cache::TtlCache;
use crate::core::error::AssistantError;
use crate::core::intent::IntentClassifier;
use crate::core::router::Router;
use crate::core::session::SessionStore;
use crate::handlers::{AdminHandler, BoardsHandler, FilesHandler, GeneralHandler, LearningHandler};
use crate::services::{
    AnswerService, BoardService, ConversationHistory, DocumentStore, KnowledgeStore, WorkItemRow,
};

/// External backends injected at construction
pub struct Collaborators {
    pub answers: Arc<dyn AnswerService>,
    pub docs: Arc<dyn DocumentStore>,
    pub boards: Arc<dyn BoardService>,
    pub history: Arc<dyn ConversationHistory>,
    pub knowledge: Arc<dyn KnowledgeStore>,
}

pub struct Assistant {
    classifier: IntentClassifier,
    sessions: Arc<SessionStore>,
    router: Router,
    history: Arc<dyn ConversationHistory>,
    board_cache: Arc<TtlCache<Arc<Vec<WorkItemRow>>>>,
    search_cache: Arc<TtlCache<String>>,
}

impl Assistant {
    pub fn new(cfg: AppConfig, collaborators: Collaborators) -> Result<Self, AssistantError> {
        let classifier = IntentClassifier::new(cfg.intent.clone())?;
        let sessions = Arc::new(SessionStore::new());

        let ttl = Duration::from_secs(cfg.cache.duration_secs);
        let board_cache: Arc<TtlCache<Arc<Vec<WorkItemRow>>>> = Arc::new(TtlCache::new(ttl));
        let search_cache: Arc<TtlCache<String>> = Arc::new(TtlCache::new(ttl));

        let files = Arc::new(FilesHandler::new(
            cfg.app.clone(),
            collaborators.docs,
            collaborators.answers.clone(),
            search_cache.clone(),
            cfg.intent.action_keywords.clone(),
        ));
        let general = Arc::new(GeneralHandler::new(
            cfg.general,
            cfg.app.name.clone(),
            collaborators.answers,
            collaborators.knowledge.clone(),
            collaborators.history.clone(),
            files.clone(),
        ));
        let router = Router::new(
            Arc::new(AdminHandler::new(
                sessions.clone(),
                board_cache.clone(),
                search_cache.clone(),
            )),
            Arc::new(BoardsHandler::new(
                cfg.boards,
                collaborators.boards,
                board_cache.clone(),
                sessions.clone(),
            )),
            files,
            general,
            Arc::new(LearningHandler::new(
                sessions.clone(),
                collaborators.knowledge,
            )),
            cfg.app.default_file_limit,
        )?;

        Ok(Self {
            classifier,
            sessions,
            router,
            history: collaborators.history,
            board_cache,
            search_cache,
        })
    }

    /// Answers one message. Infallible from the caller's perspective: handler
    /// failures surface as an apology with an incident id.
    ///
    /// Messages from the same user are serialized in arrival order (the lock
    /// is held across the whole cycle); different users proceed in parallel.
    pub async fn respond(&self, user_id: &str, message: &str, display_name: &str) -> String {
        let lock = self.sessions.user_lock(user_id).await;
        let _guard = lock.lock().await;

        self.board_cache.sweep_expired();
        self.search_cache.sweep_expired();

        let session = self.sessions.get(user_id).await;
        let intent = self.classifier.classify(message, &session);
        tracing::info!(user_id, ?intent, "message classified");

        let reply = match self
            .router
            .dispatch(intent, user_id, message, display_name)
            .await
        {
            Ok(reply) => reply,
            Err(e) => self.incident_reply(user_id, intent, &e),
        };

        self.history.add_interaction(user_id, message, &reply).await;
        reply
    }

    /// Logs the full failure, hands the user only an id to quote back.
    fn incident_reply(
        &self,
        user_id: &str,
        intent: crate::core::intent::Intent,
        error: &AssistantError,
    ) -> String {
        let incident_id = format!("ERR-{}", Local::now().format("%Y%m%d-%H%M%S"));
        tracing::error!(user_id, ?intent, %incident_id, error = %error, "handler failed");
        format!(
            "⚠️ Algo deu errado ao processar sua solicitação.\n\
             Código do erro: `{}`\n\
             Tente novamente em instantes ou avise o time técnico.",
            incident_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        InMemoryBoardService, InMemoryDocumentStore, InMemoryHistory, InMemoryKnowledge,
        MockAnswerService,
    };
    use async_trait::async_trait;
    use serde_json::Value;

    fn assistant() -> Assistant {
        Assistant::new(
            AppConfig::default(),
            Collaborators {
                answers: Arc::new(MockAnswerService),
                docs: Arc::new(InMemoryDocumentStore::new(Vec::new())),
                boards: Arc::new(InMemoryBoardService::new(Vec::new())),
                history: Arc::new(InMemoryHistory::new(10)),
                knowledge: Arc::new(InMemoryKnowledge::new()),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn greeting_gets_a_named_reply() {
        let reply = assistant().respond("u1", "bom dia!", "Ana").await;
        assert!(reply.contains("Bom dia, Ana"));
    }

    #[tokio::test]
    async fn learning_flow_survives_across_messages() {
        let a = assistant();
        a.respond("u1", "quero te ensinar algo", "Ana").await;
        a.respond("u1", "qual o ramal do RH", "Ana").await;
        let confirmation = a.respond("u1", "é o 4522", "Ana").await;
        assert!(confirmation.contains("qual o ramal do RH"));

        // The taught pair answers the same question afterwards
        let answer = a.respond("u1", "me diz qual o ramal do rh?", "Ana").await;
        assert_eq!(answer, "é o 4522");
    }

    struct FailingBoards;

    #[async_trait]
    impl crate::services::BoardService for FailingBoards {
        async fn fetch_work_items(
            &self,
            _project: &str,
            _batch_size: usize,
        ) -> Result<Vec<Value>, AssistantError> {
            Err(AssistantError::Collaborator("segredo interno".to_string()))
        }
    }

    #[tokio::test]
    async fn handler_failure_becomes_incident_reply() {
        let a = Assistant::new(
            AppConfig::default(),
            Collaborators {
                answers: Arc::new(MockAnswerService),
                docs: Arc::new(InMemoryDocumentStore::new(Vec::new())),
                boards: Arc::new(FailingBoards),
                history: Arc::new(InMemoryHistory::new(10)),
                knowledge: Arc::new(InMemoryKnowledge::new()),
            },
        )
        .unwrap();

        let reply = a.respond("u1", "analisar board de Sonar", "Ana").await;
        assert!(reply.contains("ERR-"));
        // Internal detail never reaches the user
        assert!(!reply.contains("segredo interno"));
    }
}
