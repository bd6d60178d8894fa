//! Board-analytics service
//!
//! The remote service hands back raw work-item records (JSON); processing
//! turns them into the tabular rows the boards handler filters and formats:
//! type, title, identifier, area, assignee, status, due date. Epics are only
//! included when the query asks for client/epic scope.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::core::error::AssistantError;

/// Raw work-item fetch for a named project
#[async_trait]
pub trait BoardService: Send + Sync {
    async fn fetch_work_items(
        &self,
        project: &str,
        batch_size: usize,
    ) -> Result<Vec<Value>, AssistantError>;
}

/// One processed work item
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItemRow {
    pub id: u64,
    /// Canonical lowercase type: task, user story, bug, epic
    pub item_type: String,
    pub title: String,
    pub area: String,
    pub assignee: Option<String>,
    /// Normalized lowercase state: "a fazer", "em andamento", "concluído"
    pub status: String,
    pub due_date: Option<NaiveDate>,
}

/// Turns raw records into rows, dropping anything unparseable. Epics are
/// filtered out unless `include_epics` is set.
pub fn process_work_items(items: &[Value], include_epics: bool) -> Vec<WorkItemRow> {
    items
        .iter()
        .filter_map(parse_row)
        .filter(|row| include_epics || row.item_type != "epic")
        .collect()
}

fn parse_row(item: &Value) -> Option<WorkItemRow> {
    let id = item.get("id")?.as_u64()?;
    let fields = item.get("fields")?;

    let item_type = fields
        .get("System.WorkItemType")?
        .as_str()?
        .trim()
        .to_lowercase();
    let title = fields.get("System.Title")?.as_str()?.to_string();
    let area = fields
        .get("System.AreaPath")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let assignee = fields.get("System.AssignedTo").and_then(parse_assignee);
    let status = fields
        .get("System.State")
        .and_then(Value::as_str)
        .map(normalize_state)
        .unwrap_or_default();
    let due_date = fields
        .get("Microsoft.VSTS.Scheduling.DueDate")
        .and_then(Value::as_str)
        // Date prefix of an ISO timestamp; a cut off a char boundary means
        // the value is garbage, treated as no due date
        .and_then(|s| s.get(..10))
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

    Some(WorkItemRow {
        id,
        item_type,
        title,
        area,
        assignee,
        status,
        due_date,
    })
}

// The remote API sometimes nests the assignee as an identity object
fn parse_assignee(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(obj) => obj
            .get("displayName")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string()),
        _ => None,
    }
}

/// Maps vendor state names onto the three states the handler reasons about.
fn normalize_state(raw: &str) -> String {
    match raw.trim().to_lowercase().as_str() {
        "new" | "to do" | "todo" | "a fazer" | "proposed" => "a fazer".to_string(),
        "active" | "doing" | "in progress" | "em andamento" => "em andamento".to_string(),
        "done" | "closed" | "resolved" | "concluído" | "concluido" => "concluído".to_string(),
        other => other.to_string(),
    }
}

/// In-memory board service for the CLI and tests
#[derive(Default)]
pub struct InMemoryBoardService {
    items: RwLock<Vec<Value>>,
}

impl InMemoryBoardService {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }
}

#[async_trait]
impl BoardService for InMemoryBoardService {
    async fn fetch_work_items(
        &self,
        _project: &str,
        batch_size: usize,
    ) -> Result<Vec<Value>, AssistantError> {
        let items = self.items.read().await;
        Ok(items.iter().take(batch_size).cloned().collect())
    }
}
