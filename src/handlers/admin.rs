//! Administrative commands
//!
//! Operator-facing commands carried over the same chat surface: runtime
//! status and cache clearing.

use std::sync::Arc;

use crate::core::cache::TtlCache;
use crate::core::session::SessionStore;
use crate::services::WorkItemRow;

pub const ADMIN_HELP: &str = "🔧 Comandos disponíveis:\n\
    • `/status` — sessões ativas e entradas em cache\n\
    • `/limpar cache` — descarta os dados de boards e buscas em cache";

pub struct AdminHandler {
    sessions: Arc<SessionStore>,
    board_cache: Arc<TtlCache<Arc<Vec<WorkItemRow>>>>,
    search_cache: Arc<TtlCache<String>>,
}

impl AdminHandler {
    pub fn new(
        sessions: Arc<SessionStore>,
        board_cache: Arc<TtlCache<Arc<Vec<WorkItemRow>>>>,
        search_cache: Arc<TtlCache<String>>,
    ) -> Self {
        Self {
            sessions,
            board_cache,
            search_cache,
        }
    }

    pub async fn handle(&self, message: &str) -> String {
        let lower = message.trim().to_lowercase();

        if lower.contains("/limpar cache") {
            self.board_cache.clear();
            self.search_cache.clear();
            return "🧹 Cache limpo.".to_string();
        }
        if lower.contains("/status") {
            return format!(
                "📊 Sessões ativas: {} | Cache de boards: {} | Cache de buscas: {}",
                self.sessions.active_count().await,
                self.board_cache.len(),
                self.search_cache.len()
            );
        }
        ADMIN_HELP.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::CacheKey;
    use std::time::Duration;

    fn handler() -> AdminHandler {
        AdminHandler::new(
            Arc::new(SessionStore::new()),
            Arc::new(TtlCache::new(Duration::from_secs(300))),
            Arc::new(TtlCache::new(Duration::from_secs(300))),
        )
    }

    #[tokio::test]
    async fn status_reports_counts() {
        let h = handler();
        h.sessions.get("u1").await;
        let reply = h.handle("/status").await;
        assert!(reply.contains("Sessões ativas: 1"));
    }

    #[tokio::test]
    async fn clear_empties_both_caches() {
        let h = handler();
        let now = chrono::Local::now().naive_local();
        h.search_cache
            .put(CacheKey::bucketed("search_x", now, None), "r".to_string());
        assert_eq!(h.search_cache.len(), 1);

        let reply = h.handle("/limpar cache").await;
        assert!(reply.contains("limpo"));
        assert_eq!(h.search_cache.len(), 0);
    }

    #[tokio::test]
    async fn unknown_command_prints_help() {
        let reply = handler().handle("/admin").await;
        assert!(reply.contains("Comandos disponíveis"));
    }
}
