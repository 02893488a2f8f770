//! New issue creation from free-text requests

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::decode_reply;
use crate::error::AgentError;
use crate::jira::TrackerClient;
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;

fn default_issue_type() -> String {
    "Task".to_string()
}

/// Issue fields drafted by the model before creation
#[derive(Debug, Deserialize)]
pub struct IssueDraft {
    pub summary: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_issue_type")]
    pub issue_type: String,
}

/// Drafts and creates new issues
pub struct CreationAgent {
    llm: Arc<dyn LlmClient>,
    tracker: Arc<dyn TrackerClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
}

impl CreationAgent {
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

    /// Draft an issue from a request and create it in `project`
    pub async fn create_from_request(&self, project: &str, request: &str) -> Result<String, AgentError> {
        let prompt = self
            .prompts
            .render("create-issue", &json!({"project": project, "request": request}))?;

        let response = self
            .llm
            .complete(CompletionRequest::single(prompt, self.max_tokens))
            .await?;

        let draft: IssueDraft = decode_reply("issue draft", &response.content)?;
        info!(%project, summary = %draft.summary, "Creating drafted issue");

        let created = self
            .tracker
            .create_issue(project, &draft.summary, &draft.description, &draft.issue_type)
            .await?;

        let key = created
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or("(unknown key)")
            .to_string();
        Ok(format!("Created {key}: {}", draft.summary))
    }
}
