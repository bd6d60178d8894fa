//! Project-board analytics
//!
//! Resolves the project from the message (or the user's last board), keeps
//! the user in sticky boards mode until an explicit exit, fetches work items
//! through the board service and answers keyword-driven analytical queries
//! over the processed rows. Datasets are cached under a minute-bucketed key,
//! with an `epicos` variant when the query widens to client/epic scope.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;

use crate::config::BoardsSection;
use crate::core::cache::{CacheKey, TtlCache};
use crate::core::error::AssistantError;
use crate::core::session::SessionStore;
use crate::services::{process_work_items, BoardService, WorkItemRow};

pub const HELP_MESSAGE: &str = "📋 Posso analisar seus boards! Pergunte, por exemplo:\n\
    • `visão geral do board Sonar`\n\
    • `quantas tarefas existem?`\n\
    • `tarefas em andamento da Ana`\n\
    • `qual cliente tem mais atividades?`\n\
    Digite `sair` para encerrar a análise.";
pub const SELECTION_MESSAGE: &str =
    "🤔 De qual board você quer falar? Me diga o nome do projeto.";
pub const EXIT_MESSAGE: &str = "👋 Certo, saí do modo de análise de boards.";

pub struct BoardsHandler {
    cfg: BoardsSection,
    boards: Arc<dyn BoardService>,
    cache: Arc<TtlCache<Arc<Vec<WorkItemRow>>>>,
    sessions: Arc<SessionStore>,
}

impl BoardsHandler {
    pub fn new(
        cfg: BoardsSection,
        boards: Arc<dyn BoardService>,
        cache: Arc<TtlCache<Arc<Vec<WorkItemRow>>>>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            cfg,
            boards,
            cache,
            sessions,
        }
    }

    pub async fn handle(&self, user_id: &str, message: &str) -> Result<String, AssistantError> {
        let query = message.trim().to_lowercase();

        if self.cfg.exit_commands.iter().any(|c| query == *c) {
            self.sessions
                .with_session(user_id, |s| s.boards_mode = false)
                .await;
            return Ok(EXIT_MESSAGE.to_string());
        }
        if matches!(query.as_str(), "ajuda" | "help" | "comandos") {
            return Ok(HELP_MESSAGE.to_string());
        }

        let Some(project) = self.detect_project(&query, user_id).await else {
            return Ok(SELECTION_MESSAGE.to_string());
        };

        // Entering a resolved boards conversation turns sticky mode on; only
        // the explicit exit above clears it
        self.sessions
            .with_session(user_id, |s| {
                s.boards_mode = true;
                s.last_board = Some(project.clone());
            })
            .await;

        let include_epics = self
            .cfg
            .epic_scope_keywords
            .iter()
            .any(|k| query.contains(k.as_str()));
        let rows = self.fetch_dataset(&project, include_epics).await?;
        if rows.is_empty() {
            return Ok(format!("📭 O board '{}' está sem itens no momento.", project));
        }

        Ok(self.process_query(user_id, &query, &rows, &project).await)
    }

    /// Longest project name contained in the query wins; falls back to the
    /// user's last board.
    async fn detect_project(&self, query: &str, user_id: &str) -> Option<String> {
        let mut found: Option<&String> = None;
        for project in &self.cfg.projects {
            if query.contains(&project.to_lowercase()) {
                match found {
                    Some(current) if current.len() >= project.len() => {}
                    _ => found = Some(project),
                }
            }
        }
        match found {
            Some(p) => Some(p.clone()),
            None => self.sessions.get(user_id).await.last_board,
        }
    }

    async fn fetch_dataset(
        &self,
        project: &str,
        include_epics: bool,
    ) -> Result<Arc<Vec<WorkItemRow>>, AssistantError> {
        let variant = include_epics.then_some("epicos");
        let key = CacheKey::bucketed(project, Local::now().naive_local(), variant);
        if let Some(rows) = self.cache.get(&key) {
            tracing::debug!(project, "board dataset served from cache");
            return Ok(rows);
        }

        let items = self
            .boards
            .fetch_work_items(project, self.cfg.batch_size)
            .await?;
        let rows = Arc::new(process_work_items(&items, include_epics));
        self.cache.put(key, rows.clone());
        Ok(rows)
    }

    async fn process_query(
        &self,
        user_id: &str,
        query: &str,
        rows: &[WorkItemRow],
        project: &str,
    ) -> String {
        if self.is_client_activity_query(query) {
            return client_with_most_activities(rows, project);
        }

        if let Some(name) = self.detect_collaborator(user_id, query, rows).await {
            return self.collaborator_query(query, rows, &name);
        }

        self.general_query(query, rows, project)
    }

    fn is_client_activity_query(&self, query: &str) -> bool {
        self.cfg.client_keywords.iter().any(|k| query.contains(k.as_str()))
            && self
                .cfg
                .activity_keywords
                .iter()
                .any(|k| query.contains(k.as_str()))
    }

    /// A pronoun reference resolves to the last collaborator; otherwise the
    /// query tokens are intersected with assignee names (and the hit is
    /// remembered for follow-ups).
    async fn detect_collaborator(
        &self,
        user_id: &str,
        query: &str,
        rows: &[WorkItemRow],
    ) -> Option<String> {
        if self
            .cfg
            .collaborator_references
            .iter()
            .any(|r| query.contains(r.as_str()))
        {
            return self.sessions.get(user_id).await.last_collaborator;
        }

        let tokens: std::collections::HashSet<&str> = query.split_whitespace().collect();
        for row in rows {
            let Some(name) = &row.assignee else { continue };
            let matched = name
                .to_lowercase()
                .split_whitespace()
                .any(|part| tokens.contains(part));
            if matched {
                let name = name.clone();
                self.sessions
                    .with_session(user_id, |s| s.last_collaborator = Some(name.clone()))
                    .await;
                return Some(name);
            }
        }
        None
    }

    fn collaborator_query(&self, query: &str, rows: &[WorkItemRow], name: &str) -> String {
        let state = if self.cfg.progress_keywords.iter().any(|k| query.contains(k.as_str())) {
            Some("em andamento")
        } else if self.cfg.todo_keywords.iter().any(|k| query.contains(k.as_str())) {
            Some("a fazer")
        } else if self
            .cfg
            .completed_keywords
            .iter()
            .any(|k| query.contains(k.as_str()))
        {
            Some("concluído")
        } else {
            None
        };

        let tasks: Vec<&WorkItemRow> = rows
            .iter()
            .filter(|r| r.assignee.as_deref() == Some(name))
            .filter(|r| state.map_or(true, |s| r.status == s))
            .collect();

        let title = match state {
            Some(s) => format!("Tarefas {} de {}", s, name),
            None => format!("Tarefas de {}", name),
        };
        format_task_list(&tasks, &title)
    }

    fn general_query(&self, query: &str, rows: &[WorkItemRow], project: &str) -> String {
        // "quantos/quantas <tipo>" counts before anything else
        for (phrase, item_type) in &self.cfg.item_types {
            if query.contains(&format!("quantos {}", phrase))
                || query.contains(&format!("quantas {}", phrase))
            {
                let total = rows.iter().filter(|r| r.item_type == *item_type).count();
                return format!(
                    "🔢 Existem **{}** item(ns) do tipo **{}** no board {}.",
                    total, item_type, project
                );
            }
        }
        // "mais tarefas" would also match the type listing below; workload
        // questions take precedence
        if self.cfg.task_count_keywords.iter().any(|k| query.contains(k.as_str())) {
            return match busiest_assignee(rows) {
                Some((name, count)) => format!(
                    "O colaborador com mais tarefas no total é {}, com {} tarefas.",
                    name, count
                ),
                None => "Nenhuma tarefa atribuída encontrada no board.".to_string(),
            };
        }
        for (phrase, item_type) in &self.cfg.item_types {
            if query.contains(phrase.as_str()) {
                let tasks: Vec<&WorkItemRow> =
                    rows.iter().filter(|r| r.item_type == *item_type).collect();
                return format_task_list(&tasks, &format!("{}s do board {}", item_type, project));
            }
        }

        if self.cfg.overview_keywords.iter().any(|k| query.contains(k.as_str())) {
            return format_overview(rows, project);
        }
        if self.cfg.todo_keywords.iter().any(|k| query.contains(k.as_str())) {
            let tasks: Vec<&WorkItemRow> = rows.iter().filter(|r| r.status == "a fazer").collect();
            return format_task_list(&tasks, &format!("Tarefas a fazer do board {}", project));
        }
        if self.cfg.progress_keywords.iter().any(|k| query.contains(k.as_str())) {
            let tasks: Vec<&WorkItemRow> =
                rows.iter().filter(|r| r.status == "em andamento").collect();
            return format_task_list(&tasks, &format!("Tarefas em andamento do board {}", project));
        }
        if self.cfg.overdue_keywords.iter().any(|k| query.contains(k.as_str())) {
            let today = Local::now().date_naive();
            let tasks: Vec<&WorkItemRow> = rows
                .iter()
                .filter(|r| r.status != "concluído")
                .filter(|r| r.due_date.map_or(false, |d| d < today))
                .collect();
            return format_task_list(&tasks, &format!("Tarefas atrasadas do board {}", project));
        }
        if self.cfg.hierarchy_keywords.iter().any(|k| query.contains(k.as_str())) {
            return format_story_hierarchy(rows);
        }

        format_overview(rows, project)
    }
}

/// Client = last segment of the area path; the one with most items wins.
fn client_with_most_activities(rows: &[WorkItemRow], project: &str) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        let client = row.area.rsplit('\\').next().unwrap_or(&row.area).trim();
        if !client.is_empty() {
            *counts.entry(client).or_default() += 1;
        }
    }
    match counts.into_iter().max_by_key(|(_, c)| *c) {
        Some((client, count)) => format!(
            "🏆 O cliente com mais atividades no board {} é **{}**, com {} item(ns).",
            project, client, count
        ),
        None => "Nenhuma atividade de cliente encontrada no board.".to_string(),
    }
}

fn busiest_assignee(rows: &[WorkItemRow]) -> Option<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        if let Some(name) = &row.assignee {
            *counts.entry(name.as_str()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, c)| *c)
        .map(|(name, count)| (name.to_string(), count))
}

fn format_task_list(tasks: &[&WorkItemRow], title: &str) -> String {
    if tasks.is_empty() {
        return format!("📭 {}: nenhum item encontrado.", title);
    }
    let lines: Vec<String> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let who = t.assignee.as_deref().unwrap_or("sem responsável");
            format!("{}. {} (#{}) — {} [{}]", i + 1, t.title, t.id, t.status, who)
        })
        .collect();
    format!("📋 **{}** ({}):\n{}", title, tasks.len(), lines.join("\n"))
}

fn format_overview(rows: &[WorkItemRow], project: &str) -> String {
    let mut by_type: HashMap<&str, usize> = HashMap::new();
    let mut by_status: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *by_type.entry(row.item_type.as_str()).or_default() += 1;
        *by_status.entry(row.status.as_str()).or_default() += 1;
    }

    let mut types: Vec<_> = by_type.into_iter().collect();
    types.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    let mut statuses: Vec<_> = by_status.into_iter().collect();
    statuses.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let type_lines: Vec<String> = types
        .iter()
        .map(|(t, c)| format!("• {}: {}", t, c))
        .collect();
    let status_lines: Vec<String> = statuses
        .iter()
        .map(|(s, c)| format!("• {}: {}", s, c))
        .collect();

    format!(
        "📊 **Visão geral do board {}** ({} itens)\n\nPor tipo:\n{}\n\nPor status:\n{}",
        project,
        rows.len(),
        type_lines.join("\n"),
        status_lines.join("\n")
    )
}

/// User stories with their tasks, related through the area path.
fn format_story_hierarchy(rows: &[WorkItemRow]) -> String {
    let stories: Vec<&WorkItemRow> = rows.iter().filter(|r| r.item_type == "user story").collect();
    if stories.is_empty() {
        return "❌ Nenhuma User Story encontrada no board.".to_string();
    }

    let mut lines = Vec::new();
    for story in stories {
        lines.push(format!("🔹 **{}** (#{})", story.title, story.id));
        let tasks: Vec<&WorkItemRow> = rows
            .iter()
            .filter(|r| r.item_type == "task" && r.area == story.area)
            .collect();
        if tasks.is_empty() {
            lines.push("   • _(sem tasks registradas)_".to_string());
        } else {
            for task in tasks {
                lines.push(format!("   • {} (#{})", task.title, task.id));
            }
        }
    }
    lines.join("\n")
}
