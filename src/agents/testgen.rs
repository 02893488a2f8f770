//! Test case generation for API issues

use std::sync::Arc;

use regex::Regex;
use serde_json::json;
use tracing::{debug, info};

use crate::error::AgentError;
use crate::jira::{TrackerClient, issue_text};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;

/// Sentinel the model returns when the issue already carries test cases
const HAS_TESTS: &str = "HAS_TESTS";

/// Generates test cases from an issue's endpoint description
pub struct TestGenAgent {
    llm: Arc<dyn LlmClient>,
    tracker: Arc<dyn TrackerClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
    method_pattern: Regex,
}

impl TestGenAgent {
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
            method_pattern: Regex::new(r"(?i)\b(GET|POST|PUT|DELETE)\b").unwrap(),
        }
    }

    /// Pick the method-specific prompt from the issue text
    fn detect_method(&self, text: &str) -> String {
        self.method_pattern
            .find(text)
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_else(|| "get".to_string())
    }

    /// Generate test cases for an issue
    ///
    /// An optional free-text question narrows the focus (e.g. "only the
    /// error paths").
    pub async fn create_test_cases(&self, key: &str, question: Option<&str>) -> Result<String, AgentError> {
        info!(%key, "Generating test cases");
        let issue = self.tracker.get_issue(key).await?;
        let (summary, description) = issue_text(&issue);

        let mut text = format!("{summary}\n\n{description}");
        if let Some(q) = question {
            text.push_str("\n\nFocus: ");
            text.push_str(q);
        }

        let method = self.detect_method(&text);
        debug!(%key, %method, "detect_method: chose template");

        let prompt = self
            .prompts
            .render(&format!("test-cases-{method}"), &json!({"summary": text}))
            .or_else(|_| self.prompts.render("test-cases", &json!({"summary": text})))?;

        let response = self
            .llm
            .complete(CompletionRequest::single(prompt, self.max_tokens))
            .await?;

        let reply = response.content.trim();
        if reply.starts_with(HAS_TESTS) {
            return Ok(format!("{key} already has test cases."));
        }
        Ok(reply.to_string())
    }
}
