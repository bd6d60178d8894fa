//! General conversation
//!
//! The catch-all handler for messages no other intent claims. Cheap local
//! answers run first: courtesy acknowledgement, name echo, taught-knowledge
//! lookup and a late file-intent redirect. Only what survives those reaches
//! the LLM, with a persona system prompt carrying the assistant name, the
//! current date, the detected tone and the recent conversation.

use std::sync::Arc;

use chrono::Local;

use crate::config::GeneralSection;
use crate::core::error::AssistantError;
use crate::handlers::FilesHandler;
use crate::services::{AnswerService, ConversationHistory, KnowledgeStore, Tone};

pub const COURTESY_RESPONSE: &str = "😊 De nada! Qualquer coisa é só chamar.";
/// Shown when the LLM errors or produces no usable content; the failure never
/// leaves this handler
pub const FALLBACK_MESSAGE: &str =
    "🤔 Não consegui elaborar uma resposta agora. Pode reformular a pergunta?";

pub struct GeneralHandler {
    cfg: GeneralSection,
    assistant_name: String,
    answers: Arc<dyn AnswerService>,
    knowledge: Arc<dyn KnowledgeStore>,
    history: Arc<dyn ConversationHistory>,
    files: Arc<FilesHandler>,
}

impl GeneralHandler {
    pub fn new(
        cfg: GeneralSection,
        assistant_name: String,
        answers: Arc<dyn AnswerService>,
        knowledge: Arc<dyn KnowledgeStore>,
        history: Arc<dyn ConversationHistory>,
        files: Arc<FilesHandler>,
    ) -> Self {
        Self {
            cfg,
            assistant_name,
            answers,
            knowledge,
            history,
            files,
        }
    }

    pub async fn handle(
        &self,
        user_id: &str,
        message: &str,
        display_name: &str,
    ) -> Result<String, AssistantError> {
        let lower = message.trim().to_lowercase();

        if self.is_courtesy(&lower) {
            return Ok(COURTESY_RESPONSE.to_string());
        }

        if lower.contains("meu nome") {
            return Ok(format!("Seu nome é {}! 😊", display_name));
        }

        if let Some(answer) = self.taught_answer(&lower).await {
            return Ok(answer);
        }

        // Free text that still smells like a file request (classifier scored
        // it below threshold) gets one more chance against the search chain
        if self.looks_like_file_request(&lower) {
            return self.files.search_from_message(message).await;
        }

        self.generate(user_id, message).await
    }

    /// Fixed greeting reply; never touches the LLM.
    pub fn handle_greeting(&self, message: &str, display_name: &str) -> String {
        let lower = message.to_lowercase();
        let opening = if lower.contains("bom dia") {
            "Bom dia"
        } else if lower.contains("boa tarde") {
            "Boa tarde"
        } else if lower.contains("boa noite") {
            "Boa noite"
        } else {
            "Olá"
        };
        format!(
            "{}, {}! 👋 Eu sou a {}. Posso buscar arquivos, analisar boards ou responder dúvidas. Como posso ajudar?",
            opening, display_name, self.assistant_name
        )
    }

    /// Thanks without any file word nearby reads as courtesy, not a request.
    fn is_courtesy(&self, lower: &str) -> bool {
        let positive = self
            .cfg
            .positive_words
            .iter()
            .any(|w| lower.contains(w.as_str()));
        let file_context = self
            .cfg
            .file_context_words
            .iter()
            .any(|w| lower.contains(w.as_str()));
        positive && !file_context
    }

    fn looks_like_file_request(&self, lower: &str) -> bool {
        let file_intent = self
            .cfg
            .file_intent_indicators
            .iter()
            .any(|w| lower.contains(w.as_str()));
        let casual = self
            .cfg
            .casual_indicators
            .iter()
            .any(|w| lower.contains(w.as_str()));
        file_intent && !casual
    }

    /// Answers from taught knowledge when a taught question appears inside
    /// the message.
    async fn taught_answer(&self, lower: &str) -> Option<String> {
        let entries = match self
            .knowledge
            .list_manual_entries(self.cfg.manual_lookup_limit)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "manual knowledge lookup failed, skipping");
                return None;
            }
        };
        entries
            .into_iter()
            .find(|e| lower.contains(&e.question.to_lowercase()))
            .map(|e| e.answer)
    }

    async fn generate(&self, user_id: &str, message: &str) -> Result<String, AssistantError> {
        let tone = match self.answers.classify_tone(message).await {
            Ok(tone) => tone,
            Err(e) => {
                tracing::warn!(error = %e, "tone classification failed, using neutral");
                Tone::Neutral
            }
        };

        let system_prompt = self.system_prompt(tone);
        let formatted_history = self.history.format_for_prompt(user_id).await;

        match self
            .answers
            .generate_answer(message, &system_prompt, &formatted_history, tone)
            .await
        {
            Ok(Some(answer)) => Ok(answer),
            Ok(None) => Ok(FALLBACK_MESSAGE.to_string()),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "answer generation failed, using fallback");
                Ok(FALLBACK_MESSAGE.to_string())
            }
        }
    }

    fn system_prompt(&self, tone: Tone) -> String {
        let tone_directive = match tone {
            Tone::Excited => "Responda com energia e entusiasmo.",
            Tone::Serious => "Responda de forma direta e objetiva, sem emojis.",
            Tone::Neutral => "Responda de forma simpática e natural.",
        };
        format!(
            "Você é a {}, assistente do time no chat corporativo. \
             Hoje é {}. Responda sempre em português brasileiro, em mensagens curtas. {}",
            self.assistant_name,
            Local::now().format("%d/%m/%Y"),
            tone_directive
        )
    }
}
