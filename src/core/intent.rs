//! Intent classification
//!
//! Maps a message plus the user's current session to one intent through a
//! fixed-priority rule cascade; the file category alone uses a weighted
//! heuristic score. Deterministic and total - every message classifies to
//! something, with General as the always-reachable fallback.

use std::sync::Mutex;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::config::IntentSection;
use crate::core::error::AssistantError;
use crate::core::memo::ScoreMemo;
use crate::core::session::UserSession;

/// Category chosen for an inbound message; derived, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Administrative command token present
    Admin,
    /// Board command token, or the user is in boards sticky mode
    Boards,
    /// Learning trigger phrase, or a teach flow already in progress
    Learning,
    /// Listing-pattern token ("listar arquivos", ...)
    FileList,
    /// Short message matching the greeting pattern
    Greeting,
    /// File score above the configured threshold
    File,
    /// Default fallback
    General,
}

/// Rule-cascade classifier with a memoized file score
pub struct IntentClassifier {
    cfg: IntentSection,
    greeting: Regex,
    file_extension: Regex,
    file_naming: Regex,
    memo: Mutex<ScoreMemo>,
}

impl IntentClassifier {
    pub fn new(cfg: IntentSection) -> Result<Self, AssistantError> {
        let greeting = RegexBuilder::new(&cfg.greeting_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| AssistantError::Config(format!("greeting pattern: {e}")))?;
        let file_extension = RegexBuilder::new(&cfg.file_extension_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| AssistantError::Config(format!("file extension pattern: {e}")))?;
        let file_naming = Regex::new(&cfg.file_naming_pattern)
            .map_err(|e| AssistantError::Config(format!("file naming pattern: {e}")))?;
        let memo = Mutex::new(ScoreMemo::new(cfg.memo_capacity));
        Ok(Self {
            cfg,
            greeting,
            file_extension,
            file_naming,
            memo,
        })
    }

    /// Classifies a message against the current session. First match wins:
    /// admin > boards > learning > file_list > greeting > file > general.
    pub fn classify(&self, message: &str, session: &UserSession) -> Intent {
        let lower = message.trim().to_lowercase();

        if self.cfg.admin_commands.iter().any(|c| lower.contains(c.as_str())) {
            return Intent::Admin;
        }
        // Sticky mode: follow-ups keep flowing to boards until exited
        if session.boards_mode
            || self.cfg.boards_commands.iter().any(|c| lower.contains(c.as_str()))
        {
            return Intent::Boards;
        }
        // An active teach flow captures every message until it completes
        if session.learning_in_progress()
            || self.cfg.learning_triggers.iter().any(|t| lower.contains(t.as_str()))
        {
            return Intent::Learning;
        }
        if self.cfg.list_patterns.iter().any(|p| lower.contains(p.as_str())) {
            return Intent::FileList;
        }
        // Word bound avoids misreading a long message that merely opens with
        // a greeting word
        if lower.split_whitespace().count() <= self.cfg.greeting_max_words
            && self.greeting.is_match(&lower)
        {
            return Intent::Greeting;
        }
        if self.file_score(message) > self.cfg.file_threshold {
            return Intent::File;
        }
        Intent::General
    }

    /// Heuristic score in [0, 1] of how strongly the message asks for a file.
    /// Pure in the message text; memoized through a bounded LRU.
    pub fn file_score(&self, message: &str) -> f64 {
        let lower = message.trim().to_lowercase();

        if let Ok(mut memo) = self.memo.lock() {
            if let Some(score) = memo.get(&lower) {
                return score;
            }
        }

        let score = self.compute_file_score(&lower);
        if let Ok(mut memo) = self.memo.lock() {
            memo.insert(lower, score);
        }
        score
    }

    fn compute_file_score(&self, lower: &str) -> f64 {
        let mut score = 0.0;

        if self.file_extension.is_match(lower) {
            score += 0.5;
        }
        score += 0.2
            * self
                .cfg
                .file_keywords
                .iter()
                .filter(|kw| lower.contains(kw.as_str()))
                .count() as f64;
        score += 0.15
            * self
                .cfg
                .action_keywords
                .iter()
                .filter(|kw| lower.contains(kw.as_str()))
                .count() as f64;
        if self.file_naming.is_match(lower) {
            score += 0.2;
        }
        score -= 0.2
            * self
                .cfg
                .casual_words
                .iter()
                .filter(|w| lower.contains(w.as_str()))
                .count() as f64;

        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::LearningStep;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(IntentSection::default()).unwrap()
    }

    #[test]
    fn admin_token_dominates_everything() {
        let c = classifier();
        let mut session = UserSession::default();
        session.boards_mode = true;
        // Admin wins even with a boards token present and sticky mode on
        let intent = c.classify("/status do azure boards por favor", &session);
        assert_eq!(intent, Intent::Admin);
    }

    #[test]
    fn boards_token_routes_to_boards() {
        let c = classifier();
        let intent = c.classify("analisar board de Sonar", &UserSession::default());
        assert_eq!(intent, Intent::Boards);
    }

    #[test]
    fn sticky_mode_captures_plain_followups() {
        let c = classifier();
        let mut session = UserSession::default();
        session.boards_mode = true;
        assert_eq!(c.classify("e as tarefas atrasadas?", &session), Intent::Boards);
    }

    #[test]
    fn active_learning_flow_captures_any_message() {
        let c = classifier();
        let mut session = UserSession::default();
        session.learning_step = LearningStep::AwaitingQuestion;
        assert_eq!(c.classify("Qual é a capital?", &session), Intent::Learning);
    }

    #[test]
    fn learning_trigger_starts_flow() {
        let c = classifier();
        assert_eq!(
            c.classify("quero ensinar algo novo", &UserSession::default()),
            Intent::Learning
        );
    }

    #[test]
    fn list_pattern_routes_to_file_list() {
        let c = classifier();
        assert_eq!(
            c.classify("liste os arquivos mais recentes", &UserSession::default()),
            Intent::FileList
        );
    }

    #[test]
    fn short_greeting_matches() {
        let c = classifier();
        assert_eq!(c.classify("Bom dia!", &UserSession::default()), Intent::Greeting);
    }

    #[test]
    fn seven_word_greeting_falls_through() {
        let c = classifier();
        // Greeting word present but message is 7 words long
        let intent = c.classify(
            "bom dia pessoal como estamos indo hoje?",
            &UserSession::default(),
        );
        assert_ne!(intent, Intent::Greeting);
        assert_eq!(intent, Intent::General);
    }

    #[test]
    fn strong_file_request_scores_above_threshold() {
        let c = classifier();
        let msg = "me envia o arquivo relatorio_final.pdf";
        assert!(c.file_score(msg) > 0.7);
        assert_eq!(c.classify(msg, &UserSession::default()), Intent::File);
    }

    #[test]
    fn casual_only_message_scores_zero() {
        let c = classifier();
        assert_eq!(c.file_score("valeu, obrigado! haha"), 0.0);
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let c = classifier();
        let samples = [
            "",
            "me envia agora o arquivo planilha documento relatorio contrato proposta.pdf",
            "obrigado valeu legal haha kkk tudo bem",
            "qual é o sentido da vida?",
        ];
        for msg in samples {
            let s = c.file_score(msg);
            assert!((0.0..=1.0).contains(&s), "score {s} out of range for {msg:?}");
        }
    }

    #[test]
    fn memo_hit_matches_fresh_computation() {
        let c = classifier();
        let msg = "abre o contrato_2025.docx";
        let first = c.file_score(msg);
        let second = c.file_score(msg);
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_is_general() {
        let c = classifier();
        assert_eq!(
            c.classify("qual é a previsão do tempo?", &UserSession::default()),
            Intent::General
        );
    }
}
