//! API contract validation

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::decode_reply;
use crate::error::AgentError;
use crate::jira::{TrackerClient, issue_text};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;

/// Structured verdict from a contract validation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Prose findings
    pub assessment: String,

    /// Whether the issue describes an API contract at all
    #[serde(default)]
    pub api_related: bool,

    /// Comment worth posting back to the issue, if any
    #[serde(default)]
    pub suggested_comment: Option<String>,
}

/// Checks issues that describe API endpoints for completeness
pub struct ValidatorAgent {
    llm: Arc<dyn LlmClient>,
    tracker: Arc<dyn TrackerClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
}

impl ValidatorAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tracker: Arc<dyn TrackerClient>,
        prompts: Arc<PromptLoader>,
        max_tokens: u32,
    ) -> Self {
        Self {
            llm,
            tracker,
            prompts,
            max_tokens,
        }
    }

    /// Validate the API contract described by an issue
    pub async fn validate(&self, key: &str) -> Result<ValidationReport, AgentError> {
        info!(%key, "Validating issue");
        let issue = self.tracker.get_issue(key).await?;
        let (summary, description) = issue_text(&issue);

        let prompt = self.prompts.render(
            "validate",
            &json!({"key": key, "summary": summary, "description": description}),
        )?;

        let response = self
            .llm
            .complete(CompletionRequest::single(prompt, self.max_tokens))
            .await?;

        decode_reply("validation report", &response.content)
    }
}
