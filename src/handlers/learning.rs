//! Manual teach-the-bot flow
//!
//! Three consecutive messages from the same user drive the machine:
//! trigger (discarded) -> question (captured verbatim) -> answer (persisted).
//! While the flow is active the classifier routes every message from that
//! user here, so the machine always sees them in order.

use std::sync::Arc;

use crate::core::error::AssistantError;
use crate::core::session::{LearningStep, SessionStore};
use crate::services::KnowledgeStore;

pub const ASK_QUESTION_PROMPT: &str =
    "📝 Legal! Qual pergunta você quer me ensinar a responder?";
pub const ASK_ANSWER_PROMPT: &str =
    "Entendi. E qual deve ser a resposta para essa pergunta?";
/// Persistence failed: the flow stays in AwaitingAnswer and the next message
/// retries the save with the same pending question.
pub const RETRY_MESSAGE: &str =
    "⚠️ Não consegui salvar agora. Me envie a resposta de novo, por favor.";

pub struct LearningHandler {
    sessions: Arc<SessionStore>,
    knowledge: Arc<dyn KnowledgeStore>,
}

impl LearningHandler {
    pub fn new(sessions: Arc<SessionStore>, knowledge: Arc<dyn KnowledgeStore>) -> Self {
        Self { sessions, knowledge }
    }

    /// Advances the flow one step for this message. Never escalates a
    /// persistence failure: the user gets a retry prompt instead.
    pub async fn handle(&self, user_id: &str, message: &str) -> Result<String, AssistantError> {
        let step = self.sessions.get(user_id).await.learning_step;

        match step {
            LearningStep::Idle => {
                // The trigger message itself is not the question
                self.sessions
                    .with_session(user_id, |s| {
                        s.learning_step = LearningStep::AwaitingQuestion;
                        s.pending_question = None;
                    })
                    .await;
                Ok(ASK_QUESTION_PROMPT.to_string())
            }
            LearningStep::AwaitingQuestion => {
                self.sessions
                    .with_session(user_id, |s| {
                        s.pending_question = Some(message.to_string());
                        s.learning_step = LearningStep::AwaitingAnswer;
                    })
                    .await;
                Ok(ASK_ANSWER_PROMPT.to_string())
            }
            LearningStep::AwaitingAnswer => {
                let Some(question) = self.sessions.get(user_id).await.pending_question else {
                    // Lost the question somehow; restart cleanly
                    self.sessions
                        .with_session(user_id, |s| s.learning_step = LearningStep::Idle)
                        .await;
                    return Ok(ASK_QUESTION_PROMPT.to_string());
                };

                match self.knowledge.save_manual_entry(&question, message).await {
                    Ok(confirmation) => {
                        self.sessions
                            .with_session(user_id, |s| {
                                s.learning_step = LearningStep::Idle;
                                s.pending_question = None;
                            })
                            .await;
                        Ok(confirmation)
                    }
                    Err(e) => {
                        tracing::warn!(user_id, error = %e, "manual entry persist failed, keeping flow open");
                        Ok(RETRY_MESSAGE.to_string())
                    }
                }
            }
        }
    }
}
