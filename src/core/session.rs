//! Per-user session state
//!
//! One mutable record per opaque user id, created lazily on first reference.
//! Tracks the teach-the-bot flow, the boards sticky mode and the last board /
//! collaborator the user referenced. Fields are fully independent between
//! users.
//!
//! The map lives behind a `tokio::sync::RwLock` so truly parallel requests
//! stay safe; a separate per-user mutex lets the orchestrator serialize one
//! user's messages (the learning machine depends on arrival order) without
//! blocking other users.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

/// Position inside the teach-the-bot flow.
///
/// Only advances Idle -> AwaitingQuestion -> AwaitingAnswer -> Idle; states
/// are never skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LearningStep {
    #[default]
    Idle,
    AwaitingQuestion,
    AwaitingAnswer,
}

/// Mutable state for one user
#[derive(Debug, Clone, Default)]
pub struct UserSession {
    /// Question captured while the teach flow waits for its answer
    pub pending_question: Option<String>,
    pub learning_step: LearningStep,
    /// Sticky mode: once set, plain follow-up messages keep routing to the
    /// boards handler until the user exits explicitly
    pub boards_mode: bool,
    /// Most recent board project resolved for this user
    pub last_board: Option<String>,
    /// Most recent teammate referenced in a boards query
    pub last_collaborator: Option<String>,
}

impl UserSession {
    /// True while a teach flow is capturing this user's messages.
    pub fn learning_in_progress(&self) -> bool {
        self.learning_step != LearningStep::Idle
    }
}

/// All user sessions (user_id -> UserSession)
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, UserSession>>,
    /// Per-user serialization locks, created alongside the session
    user_locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the user's session, creating the default record if absent.
    pub async fn get(&self, user_id: &str) -> UserSession {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(user_id) {
                return session.clone();
            }
        }
        let mut sessions = self.sessions.write().await;
        sessions.entry(user_id.to_string()).or_default().clone()
    }

    /// Runs `f` against the user's session under the write lock, creating the
    /// default record if absent.
    pub async fn with_session<F, R>(&self, user_id: &str, f: F) -> R
    where
        F: FnOnce(&mut UserSession) -> R,
    {
        let mut sessions = self.sessions.write().await;
        f(sessions.entry(user_id.to_string()).or_default())
    }

    /// Lock serializing this user's requests; held across a whole respond
    /// cycle so one user's messages are processed in arrival order.
    pub async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.user_locks.read().await;
            if let Some(lock) = locks.get(user_id) {
                return lock.clone();
            }
        }
        let mut locks = self.user_locks.write().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_lazily_with_defaults() {
        let store = SessionStore::new();
        assert_eq!(store.active_count().await, 0);

        let session = store.get("u1").await;
        assert_eq!(session.learning_step, LearningStep::Idle);
        assert!(!session.boards_mode);
        assert!(session.pending_question.is_none());
        assert_eq!(store.active_count().await, 1);
    }

    #[tokio::test]
    async fn mutation_is_visible_on_next_read() {
        let store = SessionStore::new();
        store
            .with_session("u1", |s| {
                s.boards_mode = true;
                s.last_board = Some("Sonar".to_string());
            })
            .await;

        let session = store.get("u1").await;
        assert!(session.boards_mode);
        assert_eq!(session.last_board.as_deref(), Some("Sonar"));
    }

    #[tokio::test]
    async fn users_do_not_share_state() {
        let store = SessionStore::new();
        store.with_session("alice", |s| s.boards_mode = true).await;
        store
            .with_session("bob", |s| s.learning_step = LearningStep::AwaitingQuestion)
            .await;

        let alice = store.get("alice").await;
        let bob = store.get("bob").await;
        assert!(alice.boards_mode);
        assert_eq!(alice.learning_step, LearningStep::Idle);
        assert!(!bob.boards_mode);
        assert_eq!(bob.learning_step, LearningStep::AwaitingQuestion);
    }

    #[tokio::test]
    async fn user_lock_is_stable_per_user() {
        let store = SessionStore::new();
        let a = store.user_lock("u1").await;
        let b = store.user_lock("u1").await;
        assert!(Arc::ptr_eq(&a, &b));
        let c = store.user_lock("u2").await;
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
