//! File listing and search
//!
//! Listing checks the store's readiness first and answers with a precise
//! configuration message when credentials are missing. Search runs an ordered
//! list of strategies - direct term, AI-interpreted term, separator/case
//! variants, per-word - where each strategy swallows its own failure and the
//! first non-empty result short-circuits the rest; exhausting them all is a
//! defined "no results" outcome, not an error. Formatted search replies are
//! cached under a minute-bucketed key.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use crate::config::AppSection;
use crate::core::cache::{CacheKey, TtlCache};
use crate::core::error::AssistantError;
use crate::services::{AnswerService, DocumentStore, Readiness, RemoteFile};

pub const NO_FILES_MESSAGE: &str = "📂 Não encontrei nenhum arquivo recente.";
pub const MISSING_TERM_MESSAGE: &str =
    "🔍 Me diga o nome (ou parte do nome) do arquivo que você procura.";
pub const CONFIG_ERROR_TOKEN: &str =
    "⚠️ O acesso aos arquivos não está configurado (token ausente). Avise o time técnico.";
pub const CONFIG_ERROR_ROOT: &str =
    "⚠️ O acesso aos arquivos não está configurado (diretório raiz ausente). Avise o time técnico.";
pub const LIST_INSTRUCTIONS: &str = "Clique no nome para abrir o arquivo.";

/// Words too short to search on their own in the per-word strategy
const MIN_WORD_LENGTH: usize = 3;

/// Filler stripped when extracting a search term from a free-text request
const FILLER_WORDS: &[&str] = &[
    "o", "a", "os", "as", "um", "uma", "de", "do", "da", "dos", "das", "me", "por", "favor",
    "pra", "para", "aquele", "aquela", "esse", "essa",
];

#[derive(Debug, Clone, Copy)]
enum SearchStrategy {
    Direct,
    AiInterpreted,
    Variations,
    PerWord,
}

const STRATEGIES: [SearchStrategy; 4] = [
    SearchStrategy::Direct,
    SearchStrategy::AiInterpreted,
    SearchStrategy::Variations,
    SearchStrategy::PerWord,
];

pub struct FilesHandler {
    app: AppSection,
    docs: Arc<dyn DocumentStore>,
    answers: Arc<dyn AnswerService>,
    cache: Arc<TtlCache<String>>,
    /// Action phrases stripped during term extraction
    action_keywords: Vec<String>,
}

impl FilesHandler {
    pub fn new(
        app: AppSection,
        docs: Arc<dyn DocumentStore>,
        answers: Arc<dyn AnswerService>,
        cache: Arc<TtlCache<String>>,
        action_keywords: Vec<String>,
    ) -> Self {
        Self {
            app,
            docs,
            answers,
            cache,
            action_keywords,
        }
    }

    /// Lists the most recent files, clamping the requested count.
    pub async fn list_files(&self, requested: usize) -> Result<String, AssistantError> {
        match self.docs.readiness() {
            Readiness::MissingToken => return Ok(CONFIG_ERROR_TOKEN.to_string()),
            Readiness::MissingRoot => return Ok(CONFIG_ERROR_ROOT.to_string()),
            Readiness::Ready => {}
        }

        let count = requested.clamp(1, self.app.max_file_limit);
        tracing::debug!(count, "listing recent files");
        let files = self.docs.list_recent_files(count).await?;
        if files.is_empty() {
            return Ok(NO_FILES_MESSAGE.to_string());
        }

        let lines: Vec<String> = files
            .iter()
            .enumerate()
            .map(|(i, f)| self.format_file_line(i + 1, f))
            .collect();
        Ok(format!(
            "📂 **{} arquivos solicitados** ({} encontrados):\n\n{}\n\n{}",
            count,
            files.len(),
            lines.join("\n"),
            LIST_INSTRUCTIONS
        ))
    }

    /// Extracts a search term from a free-text file request and searches.
    pub async fn search_from_message(&self, message: &str) -> Result<String, AssistantError> {
        let term = self.extract_search_term(message);
        if term.is_empty() {
            return Ok(MISSING_TERM_MESSAGE.to_string());
        }
        self.search(&term).await
    }

    /// Runs the strategy chain for a term, serving repeats from the cache.
    pub async fn search(&self, term: &str) -> Result<String, AssistantError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(MISSING_TERM_MESSAGE.to_string());
        }

        let resource = format!("search_{}", term.to_lowercase().replace(' ', "_"));
        let key = CacheKey::bucketed(&resource, Local::now().naive_local(), None);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(term, "search served from cache");
            return Ok(cached);
        }

        for strategy in STRATEGIES {
            match self.run_strategy(strategy, term).await {
                Ok(files) if !files.is_empty() => {
                    let reply = self.format_search_results(term, &files);
                    self.cache.put(key, reply.clone());
                    return Ok(reply);
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(term, ?strategy, error = %e, "search strategy failed, trying next");
                    continue;
                }
            }
        }

        Ok(format!(
            "🔍 Não encontrei arquivos para '{}'. Tente outro termo.",
            term
        ))
    }

    async fn run_strategy(
        &self,
        strategy: SearchStrategy,
        term: &str,
    ) -> Result<Vec<RemoteFile>, AssistantError> {
        match strategy {
            SearchStrategy::Direct => self.docs.search_files(term).await,
            SearchStrategy::AiInterpreted => {
                let cleaned = self.answers.interpret_search_term(term).await?;
                if cleaned != term {
                    self.docs.search_files(&cleaned).await
                } else {
                    Ok(Vec::new())
                }
            }
            SearchStrategy::Variations => {
                for variant in term_variations(term) {
                    if variant == term {
                        continue;
                    }
                    match self.docs.search_files(&variant).await {
                        Ok(files) if !files.is_empty() => return Ok(files),
                        Ok(_) => continue,
                        Err(e) => {
                            tracing::warn!(%variant, error = %e, "variant search failed");
                            continue;
                        }
                    }
                }
                Ok(Vec::new())
            }
            SearchStrategy::PerWord => {
                let mut found: Vec<RemoteFile> = Vec::new();
                for word in term
                    .split_whitespace()
                    .filter(|w| w.chars().count() > MIN_WORD_LENGTH)
                {
                    match self.docs.search_files(word).await {
                        Ok(files) => found.extend(files),
                        Err(e) => {
                            tracing::warn!(word, error = %e, "per-word search failed");
                            continue;
                        }
                    }
                }
                // Dedup by name, first occurrence wins
                let mut seen = std::collections::HashSet::new();
                found.retain(|f| seen.insert(f.name.clone()));
                Ok(found)
            }
        }
    }

    fn extract_search_term(&self, message: &str) -> String {
        let mut text = message.trim().to_lowercase();
        for phrase in &self.action_keywords {
            text = text.replace(phrase.as_str(), " ");
        }
        text.split_whitespace()
            .map(|w| w.trim_matches(|c: char| c == '?' || c == '!' || c == ','))
            .filter(|w| !w.is_empty() && !FILLER_WORDS.contains(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn format_search_results(&self, term: &str, files: &[RemoteFile]) -> String {
        let lines: Vec<String> = files
            .iter()
            .enumerate()
            .map(|(i, f)| self.format_file_line(i + 1, f))
            .collect();
        if files.len() == 1 {
            format!(
                "📂 Encontrei **1 arquivo** para '**{}**':\n\n{}\n\n{}",
                term, lines[0], LIST_INSTRUCTIONS
            )
        } else {
            format!(
                "📂 Encontrei **{} arquivo(s)** para '**{}**':\n\n{}\n\n{}",
                files.len(),
                term,
                lines.join("\n"),
                LIST_INSTRUCTIONS
            )
        }
    }

    fn format_file_line(&self, position: usize, file: &RemoteFile) -> String {
        let date = format_modified(file.modified.as_deref());
        match valid_url(file) {
            Some(url) => format!("{}. **[{}]({})** 📄 {}", position, file.name, url, date),
            None => format!(
                "{}. **{}** 📄 {} ⚠️ *Link indisponível*",
                position, file.name, date
            ),
        }
    }
}

/// First URL-bearing field that actually looks like a link.
fn valid_url(file: &RemoteFile) -> Option<&str> {
    [&file.web_url, &file.url, &file.server_url, &file.id]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|u| u.starts_with("http://") || u.starts_with("https://"))
}

/// Separator and case rewrites tried by the variations strategy.
fn term_variations(term: &str) -> Vec<String> {
    vec![
        term.replace(' ', "_"),
        term.replace(' ', "-"),
        term.replace('_', " "),
        term.replace('-', " "),
        term.to_lowercase(),
        title_case(term),
    ]
}

fn title_case(term: &str) -> String {
    term.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// "dd/mm/YYYY às HH:MM" from an ISO timestamp; falls back to now.
fn format_modified(iso: Option<&str>) -> String {
    let parsed = iso.and_then(|raw| {
        let trimmed = raw.trim_end_matches('Z');
        // Prefix cuts via get so a non-ASCII value reads as unparseable
        // instead of panicking on a char boundary
        trimmed
            .get(..19)
            .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
            .or_else(|| {
                trimmed
                    .get(..10)
                    .and_then(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    });
    let when = parsed.unwrap_or_else(|| Local::now().naive_local());
    format!("📅 Última modificação: {}", when.format("%d/%m/%Y às %H:%M"))
}
