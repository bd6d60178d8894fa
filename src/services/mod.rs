//! External collaborator contracts
//!
//! The core only ever talks to remote capabilities through these traits:
//! answer generation (LLM), document store, board analytics, conversation
//! history and the taught-knowledge store. In-memory implementations back the
//! CLI and the tests; the OpenAI answer service is the one concrete remote
//! client shipped here.

pub mod boards;
pub mod docs;
pub mod history;
pub mod knowledge;
pub mod llm;

pub use boards::{process_work_items, BoardService, InMemoryBoardService, WorkItemRow};
pub use docs::{DocumentStore, InMemoryDocumentStore, Readiness, RemoteFile};
pub use history::{ConversationHistory, InMemoryHistory};
pub use knowledge::{InMemoryKnowledge, KnowledgeStore, ManualEntry};
pub use llm::{AnswerService, MockAnswerService, OpenAiAnswerService, Tone};
