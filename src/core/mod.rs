//! Conversation core
//!
//! Everything between an inbound message and its reply text: error type,
//! TTL cache and score memo, per-user sessions, the intent classifier, the
//! router and the orchestrating assistant.

pub mod cache;
pub mod error;
pub mod intent;
pub mod memo;
pub mod orchestrator;
pub mod router;
pub mod session;

pub use cache::{CacheKey, TtlCache};
pub use error::AssistantError;
pub use intent::{Intent, IntentClassifier};
pub use memo::ScoreMemo;
pub use orchestrator::{Assistant, Collaborators};
pub use router::Router;
pub use session::{LearningStep, SessionStore, UserSession};
