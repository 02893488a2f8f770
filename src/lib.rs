//! IssuePilot - conversational assistant for tracked issues
//!
//! Free-text questions are classified by intent, routed to capability
//! agents (insight, validation, operations, test generation, creation),
//! and answered against a Jira-backed tracker. Multi-step requests run as
//! plans whose steps can reference earlier outputs.

pub mod agents;
pub mod cli;
pub mod config;
pub mod error;
pub mod jira;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod router;

pub use config::Config;
pub use error::AgentError;
pub use jira::{JiraClient, TrackerClient};
pub use llm::{LlmClient, create_client};
pub use router::Router;
