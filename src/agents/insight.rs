//! Read-only question answering over tracked issues

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::error::AgentError;
use crate::jira::{TrackerClient, issue_text};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;

/// Answers free-form questions about an issue and produces summaries
pub struct InsightAgent {
    llm: Arc<dyn LlmClient>,
    tracker: Arc<dyn TrackerClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
}

impl InsightAgent {
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

    /// Decide whether the issue changelog is needed to answer `question`
    ///
    /// The changelog is a separate, potentially large fetch, so it is only
    /// pulled when the question actually asks about what changed.
    pub async fn needs_history(&self, question: &str) -> Result<bool, AgentError> {
        let prompt = self.prompts.render("needs-history", &json!({"question": question}))?;
        let response = self
            .llm
            .complete(CompletionRequest::single(prompt, self.max_tokens))
            .await?;

        let verdict = response.content.trim().to_uppercase();
        debug!(%verdict, "needs_history: classified");
        Ok(verdict.starts_with("HISTORY"))
    }

    /// Answer a question about an issue
    pub async fn answer(&self, key: &str, question: &str) -> Result<String, AgentError> {
        info!(%key, "Answering question");
        let issue = self.tracker.get_issue(key).await?;

        let history = if self.needs_history(question).await? {
            let changelog = self.tracker.get_changelog(key).await?;
            serde_json::to_string(&changelog).unwrap_or_default()
        } else {
            String::new()
        };

        let prompt = self.prompts.render(
            "insight",
            &json!({
                "issue": serde_json::to_string(&issue).unwrap_or_default(),
                "history": history,
                "question": question,
            }),
        )?;

        let response = self
            .llm
            .complete(CompletionRequest::single(prompt, self.max_tokens))
            .await?;
        Ok(response.content.trim().to_string())
    }

    /// Produce a short summary of an issue
    pub async fn summarize(&self, key: &str) -> Result<String, AgentError> {
        info!(%key, "Summarizing issue");
        let issue = self.tracker.get_issue(key).await?;
        let (summary, description) = issue_text(&issue);

        let prompt = self.prompts.render(
            "issue-summary",
            &json!({"summary": summary, "description": description}),
        )?;

        let response = self
            .llm
            .complete(CompletionRequest::single(prompt, self.max_tokens))
            .await?;
        Ok(response.content.trim().to_string())
    }
}
