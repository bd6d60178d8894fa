//! Assistant error types
//!
//! Collaborator failures are contained at the orchestrator boundary and never
//! reach the caller; the user sees an apology carrying an incident id while
//! the full detail goes to the operator log.

use thiserror::Error;

/// Errors surfaced while producing a reply (collaborator calls, config)
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Any failure raised by an external collaborator (LLM, document store,
    /// board service, knowledge store)
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    #[error("Config error: {0}")]
    Config(String),
}
