//! Answer-generation service
//!
//! All backends implement AnswerService: tone classification, free-form
//! answer generation against a system prompt plus formatted history, and
//! search-term interpretation. The OpenAI client targets any OpenAI
//! compatible endpoint (configurable base_url); the mock keeps tests and the
//! offline CLI deterministic.

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::core::error::AssistantError;

/// Tone detected for a message; steers the system prompt register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Excited,
    Serious,
}

/// Answer-generation contract consumed by the general and file handlers
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn classify_tone(&self, message: &str) -> Result<Tone, AssistantError>;

    /// Free-form answer; None when the backend produced no usable content
    async fn generate_answer(
        &self,
        message: &str,
        system_prompt: &str,
        formatted_history: &str,
        tone: Tone,
    ) -> Result<Option<String>, AssistantError>;

    /// Rewrites a raw search term into something the document store is more
    /// likely to match ("aquela planilha de horas" -> "planilha horas")
    async fn interpret_search_term(&self, term: &str) -> Result<String, AssistantError>;
}

/// OpenAI compatible client: holds Client and model name
pub struct OpenAiAnswerService {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnswerService {
    pub fn new(base_url: Option<&str>, model: &str, api_key: Option<&str>) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = base_url {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    async fn chat(&self, system: &str, user: &str) -> Result<Option<String>, AssistantError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system.to_string())
                    .build()
                    .map_err(|e| AssistantError::Collaborator(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user.to_string())
                    .build()
                    .map_err(|e| AssistantError::Collaborator(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| AssistantError::Collaborator(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AssistantError::Collaborator(e.to_string()))?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|s| !s.trim().is_empty()))
    }
}

#[async_trait]
impl AnswerService for OpenAiAnswerService {
    async fn classify_tone(&self, message: &str) -> Result<Tone, AssistantError> {
        let system = "Classifique o tom da mensagem do usuário. Responda com \
                      exatamente uma palavra: neutro, animado ou sério.";
        let label = self
            .chat(system, message)
            .await?
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        Ok(match label.as_str() {
            "animado" => Tone::Excited,
            "sério" | "serio" => Tone::Serious,
            _ => Tone::Neutral,
        })
    }

    async fn generate_answer(
        &self,
        message: &str,
        system_prompt: &str,
        formatted_history: &str,
        _tone: Tone,
    ) -> Result<Option<String>, AssistantError> {
        // Tone already folded into the system prompt by the caller
        let system = if formatted_history.is_empty() {
            system_prompt.to_string()
        } else {
            format!("{}\n\n{}", system_prompt, formatted_history)
        };
        self.chat(&system, message).await
    }

    async fn interpret_search_term(&self, term: &str) -> Result<String, AssistantError> {
        let system = "Extraia da frase abaixo apenas o termo de busca de arquivo, \
                      sem artigos nem palavras de cortesia. Responda só com o termo.";
        let cleaned = self.chat(system, term).await?;
        Ok(cleaned
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| term.to_string()))
    }
}

/// Mock service: deterministic replies, no API required
#[derive(Debug, Default)]
pub struct MockAnswerService;

#[async_trait]
impl AnswerService for MockAnswerService {
    async fn classify_tone(&self, _message: &str) -> Result<Tone, AssistantError> {
        Ok(Tone::Neutral)
    }

    async fn generate_answer(
        &self,
        message: &str,
        _system_prompt: &str,
        _formatted_history: &str,
        _tone: Tone,
    ) -> Result<Option<String>, AssistantError> {
        Ok(Some(format!("Posso ajudar com isso: {}", message)))
    }

    async fn interpret_search_term(&self, term: &str) -> Result<String, AssistantError> {
        Ok(term.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_echoes_the_question() {
        let svc = MockAnswerService;
        let answer = svc
            .generate_answer("qual o horário?", "prompt", "", Tone::Neutral)
            .await
            .unwrap();
        assert!(answer.unwrap().contains("qual o horário?"));
    }

    #[tokio::test]
    async fn mock_keeps_search_term() {
        let svc = MockAnswerService;
        assert_eq!(svc.interpret_search_term("  ata reunião ").await.unwrap(), "ata reunião");
    }
}
