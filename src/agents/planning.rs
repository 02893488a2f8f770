//! Plan generation for multi-step operations

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use super::{decode_reply, strip_code_fences};
use crate::error::AgentError;
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;
use crate::router::Plan;

/// Turns a free-text operations request into an executable plan
pub struct PlanningAgent {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
}

impl PlanningAgent {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, max_tokens: u32) -> Self {
        Self {
            llm,
            prompts,
            max_tokens,
        }
    }

    /// Generate a plan for `request`
    ///
    /// A reply that does not decode as a plan yields an empty plan so the
    /// caller can fall back to a single direct operation. Provider errors
    /// still propagate.
    pub async fn generate_plan(&self, issue_key: Option<&str>, request: &str) -> Result<Plan, AgentError> {
        let prompt = self.prompts.render(
            "operations-plan",
            &json!({"issue_key": issue_key.unwrap_or(""), "request": request}),
        )?;

        let response = self
            .llm
            .complete(CompletionRequest::single(prompt, self.max_tokens))
            .await?;

        match decode_reply::<Plan>("operations plan", &response.content) {
            Ok(mut plan) => {
                if plan.issue_key.as_deref().is_some_and(str::is_empty) {
                    plan.issue_key = None;
                }
                debug!(steps = plan.steps.len(), "generate_plan: decoded");
                Ok(plan)
            }
            Err(e) => {
                warn!(error = %e, reply = %strip_code_fences(&response.content), "generate_plan: undecodable reply");
                Ok(Plan::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::llm::mock::MockLlmClient;

    fn agent(replies: &[&str]) -> PlanningAgent {
        PlanningAgent::new(
            Arc::new(MockLlmClient::replies(replies)),
            Arc::new(PromptLoader::new(None)),
            1024,
        )
    }

    #[tokio::test]
    async fn test_generate_plan_decodes_steps() {
        let agent = agent(&[r#"{"issue_key": "PROJ-1", "plan": [
            {"agent": "insight", "action": "summarize"},
            {"agent": "ops", "action": "add_comment", "parameters": {"comment": "$step1"}}
        ]}"#]);

        let plan = agent.generate_plan(None, "summarize and comment").await.unwrap();
        assert_eq!(plan.issue_key.as_deref(), Some("PROJ-1"));
        assert_eq!(plan.steps.len(), 2);
    }

    #[tokio::test]
    async fn test_undecodable_reply_yields_empty_plan() {
        let agent = agent(&["I cannot plan that."]);

        let plan = agent.generate_plan(Some("PROJ-1"), "do the thing").await.unwrap();
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let agent = PlanningAgent::new(
            Arc::new(MockLlmClient::new(vec![])),
            Arc::new(PromptLoader::new(None)),
            1024,
        );

        let err = agent.generate_plan(None, "anything").await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_empty_issue_key_is_none() {
        let agent = agent(&[r#"{"issue_key": "", "plan": []}"#]);

        let plan = agent.generate_plan(None, "anything").await.unwrap();
        assert!(plan.issue_key.is_none());
    }
}
