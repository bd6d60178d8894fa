//! End-to-end conversation flows through the public assistant API

use std::sync::Arc;

use serde_json::json;

use sofia::core::AssistantError;
use sofia::services::{
    BoardService, InMemoryBoardService, InMemoryDocumentStore, InMemoryHistory, InMemoryKnowledge,
    MockAnswerService, RemoteFile,
};
use sofia::{AppConfig, Assistant, Collaborators};

fn assistant_with(
    docs: Vec<RemoteFile>,
    boards: Arc<dyn BoardService>,
) -> Assistant {
    Assistant::new(
        AppConfig::default(),
        Collaborators {
            answers: Arc::new(MockAnswerService),
            docs: Arc::new(InMemoryDocumentStore::new(docs)),
            boards,
            history: Arc::new(InMemoryHistory::new(10)),
            knowledge: Arc::new(InMemoryKnowledge::new()),
        },
    )
    .unwrap()
}

fn assistant() -> Assistant {
    assistant_with(Vec::new(), Arc::new(InMemoryBoardService::new(Vec::new())))
}

fn board_items() -> Vec<serde_json::Value> {
    vec![
        json!({
            "id": 1,
            "fields": {
                "System.WorkItemType": "Task",
                "System.Title": "Revisar contrato",
                "System.AreaPath": "Sonar\\Acme",
                "System.AssignedTo": {"displayName": "Ana Souza"},
                "System.State": "Doing",
            }
        }),
        json!({
            "id": 2,
            "fields": {
                "System.WorkItemType": "Task",
                "System.Title": "Publicar release",
                "System.AreaPath": "Sonar\\Acme",
                "System.AssignedTo": {"displayName": "Bruno Lima"},
                "System.State": "To Do",
            }
        }),
    ]
}

#[tokio::test]
async fn learning_flow_teaches_and_answers() {
    let a = assistant();

    let r1 = a.respond("u1", "quero te ensinar algo", "Ana").await;
    assert!(r1.contains("Qual pergunta"));

    let r2 = a.respond("u1", "qual o ramal do financeiro", "Ana").await;
    assert!(r2.contains("resposta"));

    let r3 = a.respond("u1", "ramal 2001", "Ana").await;
    assert!(r3.contains("qual o ramal do financeiro"));
    assert!(r3.contains("ramal 2001"));

    let answer = a
        .respond("u1", "me diz qual o ramal do financeiro?", "Ana")
        .await;
    assert_eq!(answer, "ramal 2001");
}

#[tokio::test]
async fn sticky_boards_mode_is_per_user() {
    let a = assistant_with(
        Vec::new(),
        Arc::new(InMemoryBoardService::new(board_items())),
    );

    // u1 enters boards mode; the follow-up has no board token yet stays there
    a.respond("u1", "analisar board de Sonar", "Ana").await;
    let followup = a.respond("u1", "quantas tarefas existem?", "Ana").await;
    assert!(followup.contains("task"));

    // u2 is untouched: the same follow-up goes to the general handler
    let other = a.respond("u2", "quantas tarefas existem?", "Bia").await;
    assert!(other.contains("Posso ajudar com isso"));

    // u1 exits; the next plain message no longer routes to boards
    a.respond("u1", "sair", "Ana").await;
    let after_exit = a.respond("u1", "quantas tarefas existem?", "Ana").await;
    assert!(after_exit.contains("Posso ajudar com isso"));
}

#[tokio::test]
async fn file_request_finds_and_links_the_file() {
    let a = assistant_with(
        vec![RemoteFile {
            name: "relatorio_mensal.pdf".to_string(),
            web_url: Some("https://docs.example.com/relatorio_mensal.pdf".to_string()),
            modified: Some("2025-03-10T09:00:00Z".to_string()),
            ..Default::default()
        }],
        Arc::new(InMemoryBoardService::new(Vec::new())),
    );

    let reply = a
        .respond("u1", "me envia o arquivo relatorio_mensal.pdf", "Ana")
        .await;
    assert!(reply.contains("[relatorio_mensal.pdf](https://docs.example.com/relatorio_mensal.pdf)"));
}

struct FailingBoards;

#[async_trait::async_trait]
impl BoardService for FailingBoards {
    async fn fetch_work_items(
        &self,
        _project: &str,
        _batch_size: usize,
    ) -> Result<Vec<serde_json::Value>, AssistantError> {
        Err(AssistantError::Collaborator(
            "connection refused 10.0.0.7".to_string(),
        ))
    }
}

#[tokio::test]
async fn failures_surface_as_incident_ids_only() {
    let a = assistant_with(Vec::new(), Arc::new(FailingBoards));

    let reply = a.respond("u1", "analisar board de Sonar", "Ana").await;
    assert!(reply.contains("Código do erro"));
    assert!(reply.contains("ERR-"));
    assert!(!reply.contains("connection refused"));
    assert!(!reply.contains("10.0.0.7"));
}

#[tokio::test]
async fn admin_status_counts_sessions() {
    let a = assistant();
    a.respond("u1", "oi", "Ana").await;
    a.respond("u2", "oi", "Bia").await;

    let reply = a.respond("u1", "/status", "Ana").await;
    assert!(reply.contains("Sessões ativas: 2"));
}
