//! Error taxonomy for the router and capability agents
//!
//! Failures from the three outbound origins (tracker, LLM provider,
//! deployment configuration) stay distinguishable all the way up to the
//! router, which maps each kind to a different user-facing message.
//! Configuration errors are never reduced to a chat reply; they propagate.

use thiserror::Error;

use crate::jira::TrackerError;
use crate::llm::LlmError;

/// Errors raised by capability agents and the plan executor
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("provider error: {0}")]
    Provider(#[from] LlmError),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to decode {what}: {detail}")]
    Decode { what: &'static str, detail: String },

    #[error("unknown action '{action}' on agent '{agent}'")]
    UnknownAction { agent: String, action: String },

    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Configuration errors signal a deployment defect and must not be
    /// swallowed by the router's generic handler
    pub fn is_configuration(&self) -> bool {
        matches!(self, AgentError::Configuration(_))
    }
}
