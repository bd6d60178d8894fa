//! Sofia - assistente conversacional do time
//!
//! Entry point: initializes logging, loads configuration, wires the
//! assistant over the configured collaborators and runs a line-based chat
//! loop on stdin.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;

use sofia::services::{
    AnswerService, InMemoryBoardService, InMemoryDocumentStore, InMemoryHistory, InMemoryKnowledge,
    MockAnswerService, OpenAiAnswerService,
};
use sofia::{load_config, Assistant, Collaborators};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sofia::observability::init();

    let cfg = load_config(None).context("failed to load configuration")?;
    let assistant_name = cfg.app.name.clone();
    let history_turns = cfg.general.history_turns;

    // With an API key the answer service goes to the configured endpoint;
    // without one the mock keeps the CLI usable offline
    let answers: Arc<dyn AnswerService> = match std::env::var("OPENAI_API_KEY") {
        Ok(key) => Arc::new(OpenAiAnswerService::new(
            cfg.llm.base_url.as_deref(),
            &cfg.llm.model,
            Some(&key),
        )),
        Err(_) => {
            tracing::warn!("OPENAI_API_KEY not set, using the mock answer service");
            Arc::new(MockAnswerService)
        }
    };

    let assistant = Assistant::new(
        cfg,
        Collaborators {
            answers,
            docs: Arc::new(InMemoryDocumentStore::default()),
            boards: Arc::new(InMemoryBoardService::default()),
            history: Arc::new(InMemoryHistory::new(history_turns)),
            knowledge: Arc::new(InMemoryKnowledge::new()),
        },
    )
    .context("failed to build the assistant")?;

    let user_id = std::env::var("USER").unwrap_or_else(|_| "local".to_string());
    let display_name = user_id.clone();

    println!("{} pronta. Digite sua mensagem (Ctrl-D para sair).", assistant_name);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush().context("stdout flush failed")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("stdin read failed")?;
        if read == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        let reply = assistant.respond(&user_id, message, &display_name).await;
        println!("{}\n", reply);
    }

    Ok(())
}
