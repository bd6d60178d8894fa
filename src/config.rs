//! Application configuration: loaded from config/default.toml and environment
//!
//! Load order: TOML file first, then `SOFIA__*` environment overrides (double
//! underscore nests keys, e.g. `SOFIA__CACHE__DURATION_SECS=600`).
//!
//! Every pattern set, threshold and duration the classifier, cache and
//! handlers consume lives here and is handed over at construction, so each
//! component can be tested with an injected configuration.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Configuration root (top level of config/default.toml)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub intent: IntentSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub boards: BoardsSection,
    #[serde(default)]
    pub general: GeneralSection,
    #[serde(default)]
    pub llm: LlmSection,
}

/// [app] section: assistant name and file listing limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    /// Files returned by a listing when the user gives no count
    pub default_file_limit: usize,
    /// Hard ceiling for a requested listing count
    pub max_file_limit: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "Sofia".to_string(),
            default_file_limit: 10,
            max_file_limit: 30,
        }
    }
}

/// [intent] section: token sets and patterns driving the classifier cascade
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntentSection {
    #[serde(default = "default_admin_commands")]
    pub admin_commands: Vec<String>,
    #[serde(default = "default_boards_commands")]
    pub boards_commands: Vec<String>,
    #[serde(default = "default_learning_triggers")]
    pub learning_triggers: Vec<String>,
    #[serde(default = "default_list_patterns")]
    pub list_patterns: Vec<String>,
    /// Greeting regex, matched case-insensitively on messages of at most
    /// `greeting_max_words` words
    #[serde(default = "default_greeting_pattern")]
    pub greeting_pattern: String,
    #[serde(default = "default_greeting_max_words")]
    pub greeting_max_words: usize,
    #[serde(default = "default_file_extension_pattern")]
    pub file_extension_pattern: String,
    #[serde(default = "default_file_naming_pattern")]
    pub file_naming_pattern: String,
    #[serde(default = "default_file_keywords")]
    pub file_keywords: Vec<String>,
    #[serde(default = "default_action_keywords")]
    pub action_keywords: Vec<String>,
    #[serde(default = "default_casual_words")]
    pub casual_words: Vec<String>,
    /// A message scores above this to classify as a file request
    #[serde(default = "default_file_threshold")]
    pub file_threshold: f64,
    /// Capacity of the score memo (LRU)
    #[serde(default = "default_memo_capacity")]
    pub memo_capacity: usize,
}

impl Default for IntentSection {
    fn default() -> Self {
        Self {
            admin_commands: default_admin_commands(),
            boards_commands: default_boards_commands(),
            learning_triggers: default_learning_triggers(),
            list_patterns: default_list_patterns(),
            greeting_pattern: default_greeting_pattern(),
            greeting_max_words: default_greeting_max_words(),
            file_extension_pattern: default_file_extension_pattern(),
            file_naming_pattern: default_file_naming_pattern(),
            file_keywords: default_file_keywords(),
            action_keywords: default_action_keywords(),
            casual_words: default_casual_words(),
            file_threshold: default_file_threshold(),
            memo_capacity: default_memo_capacity(),
        }
    }
}

fn default_admin_commands() -> Vec<String> {
    vec!["/status".into(), "/limpar cache".into(), "/admin".into()]
}

fn default_boards_commands() -> Vec<String> {
    vec![
        "azure boards".into(),
        "analisar board".into(),
        "analise o board".into(),
        "board de".into(),
        "boards".into(),
    ]
}

fn default_learning_triggers() -> Vec<String> {
    vec![
        "ensinar algo".into(),
        "quero te ensinar".into(),
        "vou te ensinar".into(),
        "aprenda isso".into(),
    ]
}

fn default_list_patterns() -> Vec<String> {
    vec![
        "listar arquivos".into(),
        "liste os arquivos".into(),
        "lista de arquivos".into(),
        "mostrar arquivos".into(),
        "me mostre os arquivos".into(),
        "arquivos recentes".into(),
        "últimos arquivos".into(),
        "ultimos arquivos".into(),
    ]
}

fn default_greeting_pattern() -> String {
    r"\b(oi|olá|ola|opa|eaí|eai|e aí|bom dia|boa tarde|boa noite|hey|hello|hi)\b".into()
}

fn default_greeting_max_words() -> usize {
    6
}

fn default_file_extension_pattern() -> String {
    r"\.(pdf|docx?|xlsx?|pptx?|txt|csv|png|jpe?g|zip|rar)\b".into()
}

fn default_file_naming_pattern() -> String {
    // Filename-looking token: words glued by underscore or hyphen
    r"\b\w+[_-]\w+(?:[_-]\w+)*\b".into()
}

fn default_file_keywords() -> Vec<String> {
    vec![
        "arquivo".into(),
        "documento".into(),
        "planilha".into(),
        "apresentação".into(),
        "apresentacao".into(),
        "relatório".into(),
        "relatorio".into(),
        "contrato".into(),
        "proposta".into(),
    ]
}

fn default_action_keywords() -> Vec<String> {
    vec![
        "envia".into(),
        "enviar".into(),
        "manda".into(),
        "mandar".into(),
        "abrir".into(),
        "abre".into(),
        "baixar".into(),
        "me passa".into(),
        "preciso do".into(),
        "preciso da".into(),
    ]
}

fn default_casual_words() -> Vec<String> {
    vec![
        "obrigado".into(),
        "obrigada".into(),
        "valeu".into(),
        "legal".into(),
        "haha".into(),
        "kkk".into(),
        "tudo bem".into(),
        "bom te ver".into(),
    ]
}

fn default_file_threshold() -> f64 {
    0.7
}

fn default_memo_capacity() -> usize {
    256
}

/// [cache] section: TTL shared by the boards and search caches
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    #[serde(default = "default_cache_duration_secs")]
    pub duration_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            duration_secs: default_cache_duration_secs(),
        }
    }
}

fn default_cache_duration_secs() -> u64 {
    300
}

/// [boards] section: known projects and the keyword sets the boards handler
/// matches against lowercased queries
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoardsSection {
    /// Project names the handler can resolve from a message
    #[serde(default = "default_board_projects")]
    pub projects: Vec<String>,
    /// Work items fetched per request
    #[serde(default = "default_board_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_exit_commands")]
    pub exit_commands: Vec<String>,
    #[serde(default = "default_client_keywords")]
    pub client_keywords: Vec<String>,
    #[serde(default = "default_activity_keywords")]
    pub activity_keywords: Vec<String>,
    /// Queries mentioning epics/clients fetch a wider dataset and are cached
    /// under a distinct key variant
    #[serde(default = "default_epic_scope_keywords")]
    pub epic_scope_keywords: Vec<String>,
    /// Pronoun-style references resolved to the last collaborator mentioned
    #[serde(default = "default_collaborator_references")]
    pub collaborator_references: Vec<String>,
    #[serde(default = "default_progress_keywords")]
    pub progress_keywords: Vec<String>,
    #[serde(default = "default_todo_keywords")]
    pub todo_keywords: Vec<String>,
    #[serde(default = "default_completed_keywords")]
    pub completed_keywords: Vec<String>,
    #[serde(default = "default_overview_keywords")]
    pub overview_keywords: Vec<String>,
    #[serde(default = "default_overdue_keywords")]
    pub overdue_keywords: Vec<String>,
    #[serde(default = "default_task_count_keywords")]
    pub task_count_keywords: Vec<String>,
    #[serde(default = "default_hierarchy_keywords")]
    pub hierarchy_keywords: Vec<String>,
    /// Query phrase -> canonical work item type
    #[serde(default = "default_item_types")]
    pub item_types: HashMap<String, String>,
}

impl Default for BoardsSection {
    fn default() -> Self {
        Self {
            projects: default_board_projects(),
            batch_size: default_board_batch_size(),
            exit_commands: default_exit_commands(),
            client_keywords: default_client_keywords(),
            activity_keywords: default_activity_keywords(),
            epic_scope_keywords: default_epic_scope_keywords(),
            collaborator_references: default_collaborator_references(),
            progress_keywords: default_progress_keywords(),
            todo_keywords: default_todo_keywords(),
            completed_keywords: default_completed_keywords(),
            overview_keywords: default_overview_keywords(),
            overdue_keywords: default_overdue_keywords(),
            task_count_keywords: default_task_count_keywords(),
            hierarchy_keywords: default_hierarchy_keywords(),
            item_types: default_item_types(),
        }
    }
}

fn default_board_projects() -> Vec<String> {
    vec!["Sonar".into(), "Sonar Labs".into()]
}

fn default_board_batch_size() -> usize {
    100
}

fn default_exit_commands() -> Vec<String> {
    vec![
        "sair".into(),
        "sair do modo boards".into(),
        "encerrar análise".into(),
        "encerrar analise".into(),
    ]
}

fn default_client_keywords() -> Vec<String> {
    vec!["cliente".into(), "clientes".into()]
}

fn default_activity_keywords() -> Vec<String> {
    vec![
        "atividade".into(),
        "atividades".into(),
        "demanda".into(),
        "demandas".into(),
    ]
}

fn default_epic_scope_keywords() -> Vec<String> {
    vec![
        "cliente".into(),
        "clientes".into(),
        "épico".into(),
        "epico".into(),
        "épicos".into(),
        "epicos".into(),
    ]
}

fn default_collaborator_references() -> Vec<String> {
    vec![
        "dele".into(),
        "dela".into(),
        "desse colaborador".into(),
        "dessa pessoa".into(),
        "do mesmo".into(),
    ]
}

fn default_progress_keywords() -> Vec<String> {
    vec!["em andamento".into(), "fazendo".into(), "em progresso".into()]
}

fn default_todo_keywords() -> Vec<String> {
    vec!["a fazer".into(), "pendente".into(), "pendentes".into()]
}

fn default_completed_keywords() -> Vec<String> {
    vec![
        "concluída".into(),
        "concluida".into(),
        "concluído".into(),
        "concluido".into(),
        "finalizada".into(),
        "finalizado".into(),
    ]
}

fn default_overview_keywords() -> Vec<String> {
    vec![
        "visão geral".into(),
        "visao geral".into(),
        "resumo".into(),
        "overview".into(),
    ]
}

fn default_overdue_keywords() -> Vec<String> {
    vec![
        "atrasada".into(),
        "atrasado".into(),
        "atrasadas".into(),
        "atrasados".into(),
        "em atraso".into(),
    ]
}

fn default_task_count_keywords() -> Vec<String> {
    vec![
        "mais tarefas".into(),
        "mais atividades".into(),
        "mais sobrecarregado".into(),
    ]
}

fn default_hierarchy_keywords() -> Vec<String> {
    vec![
        "hierarquia".into(),
        "user stories e tasks".into(),
        "estrutura do board".into(),
    ]
}

fn default_item_types() -> HashMap<String, String> {
    HashMap::from([
        ("tarefas".to_string(), "task".to_string()),
        ("tasks".to_string(), "task".to_string()),
        ("user stories".to_string(), "user story".to_string()),
        ("histórias".to_string(), "user story".to_string()),
        ("historias".to_string(), "user story".to_string()),
        ("bugs".to_string(), "bug".to_string()),
        ("épicos".to_string(), "epic".to_string()),
        ("epicos".to_string(), "epic".to_string()),
    ])
}

/// [general] section: word sets for courtesy / casual / file-intent detection
/// inside the general handler
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralSection {
    #[serde(default = "default_positive_words")]
    pub positive_words: Vec<String>,
    #[serde(default = "default_file_context_words")]
    pub file_context_words: Vec<String>,
    #[serde(default = "default_casual_indicators")]
    pub casual_indicators: Vec<String>,
    #[serde(default = "default_file_intent_indicators")]
    pub file_intent_indicators: Vec<String>,
    /// Taught entries scanned when answering from manual knowledge
    #[serde(default = "default_manual_lookup_limit")]
    pub manual_lookup_limit: usize,
    /// History turns folded into the system prompt
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            positive_words: default_positive_words(),
            file_context_words: default_file_context_words(),
            casual_indicators: default_casual_indicators(),
            file_intent_indicators: default_file_intent_indicators(),
            manual_lookup_limit: default_manual_lookup_limit(),
            history_turns: default_history_turns(),
        }
    }
}

fn default_positive_words() -> Vec<String> {
    vec![
        "obrigado".into(),
        "obrigada".into(),
        "valeu".into(),
        "show".into(),
        "perfeito".into(),
        "ótimo".into(),
        "otimo".into(),
    ]
}

fn default_file_context_words() -> Vec<String> {
    vec![
        "arquivo".into(),
        "documento".into(),
        "planilha".into(),
        "relatório".into(),
        "relatorio".into(),
    ]
}

fn default_casual_indicators() -> Vec<String> {
    vec![
        "como você está".into(),
        "como vc está".into(),
        "tudo bem".into(),
        "bom final de semana".into(),
        "kkk".into(),
        "haha".into(),
    ]
}

fn default_file_intent_indicators() -> Vec<String> {
    vec![
        "me envia".into(),
        "me manda".into(),
        "procura o arquivo".into(),
        "busca o arquivo".into(),
        "encontre o documento".into(),
        "acha o arquivo".into(),
    ]
}

fn default_manual_lookup_limit() -> usize {
    50
}

fn default_history_turns() -> usize {
    10
}

/// [llm] section: model used by the OpenAI-backed answer service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            intent: IntentSection::default(),
            cache: CacheSection::default(),
            boards: BoardsSection::default(),
            general: GeneralSection::default(),
            llm: LlmSection::default(),
        }
    }
}

/// Load configuration from the config directory; SOFIA__* env vars override
///
/// 1. Looks for config/default.toml, ../config/default.toml, default.toml in
///    order and takes the first that exists as the base source
/// 2. If config_path is given and exists, it is appended (overriding keys)
/// 3. Environment variables SOFIA__* are applied last (double underscore
///    separates nested keys)
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SOFIA")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_the_keyword_sets() {
        let cfg = AppConfig::default();
        assert!(cfg.intent.learning_triggers.iter().any(|t| t == "ensinar algo"));
        assert!(cfg.intent.file_threshold > 0.0 && cfg.intent.file_threshold < 1.0);
        assert_eq!(cfg.intent.memo_capacity, 256);
        assert_eq!(cfg.cache.duration_secs, 300);
    }

    #[test]
    fn item_types_map_resolves_plurals() {
        let cfg = BoardsSection::default();
        assert_eq!(cfg.item_types.get("tarefas").map(String::as_str), Some("task"));
        assert_eq!(cfg.item_types.get("bugs").map(String::as_str), Some("bug"));
    }
}
