//! Sofia - assistente conversacional do time
//!
//! Module map:
//! - **config**: application configuration (TOML + environment variables)
//! - **core**: classification, sessions, caching, routing, orchestration
//! - **handlers**: one reply-producing handler per intent family
//! - **services**: collaborator traits (LLM, documents, boards, history,
//!   knowledge) plus in-memory and OpenAI-backed implementations
//! - **observability**: tracing subscriber setup

pub mod config;
pub mod core;
pub mod handlers;
pub mod observability;
pub mod services;

pub use config::{load_config, AppConfig};
pub use core::{Assistant, Collaborators};
