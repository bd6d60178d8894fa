//! Intent dispatch
//!
//! Pure marshalling: one classified intent maps to one handler call. The
//! router never touches session state and carries no reply wording of its
//! own; the only parsing it does is pulling a requested count out of a file
//! listing message.

use std::sync::Arc;

use regex::Regex;

use crate::core::error::AssistantError;
use crate::core::intent::Intent;
use crate::handlers::{AdminHandler, BoardsHandler, FilesHandler, GeneralHandler, LearningHandler};

pub struct Router {
    admin: Arc<AdminHandler>,
    boards: Arc<BoardsHandler>,
    files: Arc<FilesHandler>,
    general: Arc<GeneralHandler>,
    learning: Arc<LearningHandler>,
    default_file_limit: usize,
    count_pattern: Regex,
}

impl Router {
    pub fn new(
        admin: Arc<AdminHandler>,
        boards: Arc<BoardsHandler>,
        files: Arc<FilesHandler>,
        general: Arc<GeneralHandler>,
        learning: Arc<LearningHandler>,
        default_file_limit: usize,
    ) -> Result<Self, AssistantError> {
        let count_pattern = Regex::new(r"\d+")
            .map_err(|e| AssistantError::Config(format!("count pattern: {e}")))?;
        Ok(Self {
            admin,
            boards,
            files,
            general,
            learning,
            default_file_limit,
            count_pattern,
        })
    }

    pub async fn dispatch(
        &self,
        intent: Intent,
        user_id: &str,
        message: &str,
        display_name: &str,
    ) -> Result<String, AssistantError> {
        tracing::debug!(user_id, ?intent, "dispatching");
        match intent {
            Intent::Admin => Ok(self.admin.handle(message).await),
            Intent::Boards => self.boards.handle(user_id, message).await,
            Intent::Learning => self.learning.handle(user_id, message).await,
            Intent::FileList => {
                let count = self.extract_list_count(message);
                self.files.list_files(count).await
            }
            Intent::Greeting => Ok(self.general.handle_greeting(message, display_name)),
            Intent::File => self.files.search_from_message(message).await,
            Intent::General => self.general.handle(user_id, message, display_name).await,
        }
    }

    /// First number in the message, or the configured default. The files
    /// handler applies the hard ceiling.
    fn extract_list_count(&self, message: &str) -> usize {
        self.count_pattern
            .find(message)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(self.default_file_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, AppSection, IntentSection};
    use crate::core::cache::TtlCache;
    use crate::core::session::SessionStore;
    use crate::services::{
        InMemoryBoardService, InMemoryDocumentStore, InMemoryHistory, InMemoryKnowledge,
        MockAnswerService, RemoteFile,
    };
    use std::time::Duration;

    fn router() -> Router {
        let cfg = AppConfig::default();
        let sessions = Arc::new(SessionStore::new());
        let board_cache = Arc::new(TtlCache::new(Duration::from_secs(300)));
        let search_cache = Arc::new(TtlCache::new(Duration::from_secs(300)));
        let answers: Arc<dyn crate::services::AnswerService> = Arc::new(MockAnswerService);
        let knowledge: Arc<InMemoryKnowledge> = Arc::new(InMemoryKnowledge::new());

        let files = Arc::new(FilesHandler::new(
            AppSection::default(),
            Arc::new(InMemoryDocumentStore::new(vec![RemoteFile {
                name: "ata.docx".to_string(),
                web_url: Some("https://docs.example.com/ata.docx".to_string()),
                ..Default::default()
            }])),
            answers.clone(),
            search_cache.clone(),
            IntentSection::default().action_keywords,
        ));
        let general = Arc::new(GeneralHandler::new(
            cfg.general.clone(),
            cfg.app.name.clone(),
            answers,
            knowledge.clone(),
            Arc::new(InMemoryHistory::new(10)),
            files.clone(),
        ));
        Router::new(
            Arc::new(AdminHandler::new(
                sessions.clone(),
                board_cache.clone(),
                search_cache.clone(),
            )),
            Arc::new(BoardsHandler::new(
                cfg.boards.clone(),
                Arc::new(InMemoryBoardService::new(Vec::new())),
                board_cache,
                sessions.clone(),
            )),
            files,
            general,
            Arc::new(LearningHandler::new(sessions, knowledge)),
            cfg.app.default_file_limit,
        )
        .unwrap()
    }

    #[test]
    fn count_extraction_takes_first_number_or_default() {
        let r = router();
        assert_eq!(r.extract_list_count("liste os 5 últimos arquivos"), 5);
        assert_eq!(r.extract_list_count("listar arquivos"), 10);
    }

    #[tokio::test]
    async fn greeting_dispatch_never_errors() {
        let reply = router()
            .dispatch(Intent::Greeting, "u1", "bom dia", "Ana")
            .await
            .unwrap();
        assert!(reply.contains("Ana"));
    }

    #[tokio::test]
    async fn file_list_dispatch_lists_files() {
        let reply = router()
            .dispatch(Intent::FileList, "u1", "listar arquivos", "Ana")
            .await
            .unwrap();
        assert!(reply.contains("ata.docx"));
    }
}
