//! Mutating tracker operations
//!
//! Every write to the tracker goes through this agent: comments, field
//! updates, workflow transitions, and issue creation. The free-text
//! `operate` entry point maps a request to exactly one of these through a
//! schema-checked decode of the model reply.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::decode_reply;
use crate::error::AgentError;
use crate::jira::{Transition, TrackerClient};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;

fn default_issue_type() -> String {
    "Task".to_string()
}

/// A single operation decoded from a model reply
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedAction {
    AddComment {
        issue_key: Option<String>,
        comment: String,
    },
    TransitionIssue {
        issue_key: Option<String>,
        #[serde(alias = "transition_name")]
        transition: String,
    },
    UpdateFields {
        issue_key: Option<String>,
        fields: Value,
    },
    FillFieldByLabel {
        issue_key: Option<String>,
        field_label: String,
        value: Value,
    },
    CreateIssue {
        project_key: String,
        summary: String,
        description: String,
        #[serde(default = "default_issue_type")]
        issue_type: String,
    },
    #[serde(other)]
    Unknown,
}

/// Executes mutating operations against the tracker
pub struct OperationsAgent {
    llm: Arc<dyn LlmClient>,
    tracker: Arc<dyn TrackerClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
}

impl OperationsAgent {
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

    /// Post a comment on an issue
    pub async fn add_comment(&self, key: &str, comment: &str) -> Result<String, AgentError> {
        self.tracker.add_comment(key, comment).await?;
        Ok(format!("Added comment to {key}."))
    }

    /// Update issue fields from a `{field_id: value}` object
    pub async fn update_fields(&self, key: &str, fields: &Value) -> Result<String, AgentError> {
        self.tracker.update_fields(key, fields).await?;
        Ok(format!("Updated fields on {key}."))
    }

    /// Update a field addressed by its human-readable label
    ///
    /// Resolves the label to a field id through the tracker's field
    /// metadata. An unknown label fails this operation only.
    pub async fn fill_field_by_label(&self, key: &str, label: &str, value: &Value) -> Result<String, AgentError> {
        let fields = self.tracker.list_fields().await?;
        let field = fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(label))
            .ok_or_else(|| AgentError::Other(format!("No field labeled '{label}' exists")))?;

        let mut payload = serde_json::Map::new();
        payload.insert(field.id.clone(), value.clone());
        self.tracker.update_fields(key, &Value::Object(payload)).await?;
        Ok(format!("Set '{}' on {key}.", field.name))
    }

    /// Move an issue through its workflow
    ///
    /// Matches the requested name against available transitions by id or
    /// name, case-insensitively. When nothing matches, the model is asked
    /// for the closest available transition and that suggestion is
    /// reported back without executing it.
    pub async fn transition(&self, key: &str, requested: &str) -> Result<String, AgentError> {
        let transitions = self.tracker.get_transitions(key).await?;

        if let Some(matched) = find_transition(&transitions, requested) {
            let name = matched.display_name().unwrap_or(&matched.id).to_string();
            self.tracker.transition_issue(key, &matched.id).await?;
            info!(%key, %name, "Transitioned issue");
            return Ok(format!("Moved {key} to '{name}'."));
        }

        let options: Vec<String> = transitions
            .iter()
            .map(|t| t.display_name().unwrap_or(&t.id).to_string())
            .collect();
        if options.is_empty() {
            return Ok(format!("{key} has no available transitions."));
        }

        let prompt = self.prompts.render(
            "transition-choice",
            &json!({"requested": requested, "options": options.join(", ")}),
        )?;
        let response = self
            .llm
            .complete(CompletionRequest::single(prompt, self.max_tokens))
            .await?;

        let suggestion = response.content.trim();
        if suggestion != "NONE" && options.iter().any(|o| o.eq_ignore_ascii_case(suggestion)) {
            return Ok(format!(
                "No transition named '{requested}' on {key}. Did you mean '{suggestion}'? Available: {}",
                options.join(", ")
            ));
        }

        Ok(format!(
            "No transition named '{requested}' on {key}. Available: {}",
            options.join(", ")
        ))
    }

    /// Create a new issue
    pub async fn create(
        &self,
        project: &str,
        summary: &str,
        description: &str,
        issue_type: &str,
    ) -> Result<String, AgentError> {
        let created = self.tracker.create_issue(project, summary, description, issue_type).await?;
        let key = created
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or("(unknown key)")
            .to_string();
        Ok(format!("Created {key}: {summary}"))
    }

    /// Map a free-text request to a single operation and execute it
    pub async fn operate(&self, issue_key: Option<&str>, question: &str) -> Result<String, AgentError> {
        let prompt = self.prompts.render(
            "single-operation",
            &json!({"issue_key": issue_key.unwrap_or(""), "question": question}),
        )?;
        let response = self
            .llm
            .complete(CompletionRequest::single(prompt, self.max_tokens))
            .await?;

        let action: PlannedAction = decode_reply("operation", &response.content)?;
        self.execute(issue_key, action).await
    }

    async fn execute(&self, context_key: Option<&str>, action: PlannedAction) -> Result<String, AgentError> {
        match action {
            PlannedAction::AddComment { issue_key, comment } => {
                let key = resolve_key(issue_key.as_deref(), context_key)?;
                self.add_comment(key, &comment).await
            }
            PlannedAction::TransitionIssue { issue_key, transition } => {
                let key = resolve_key(issue_key.as_deref(), context_key)?;
                self.transition(key, &transition).await
            }
            PlannedAction::UpdateFields { issue_key, fields } => {
                let key = resolve_key(issue_key.as_deref(), context_key)?;
                self.update_fields(key, &fields).await
            }
            PlannedAction::FillFieldByLabel {
                issue_key,
                field_label,
                value,
            } => {
                let key = resolve_key(issue_key.as_deref(), context_key)?;
                self.fill_field_by_label(key, &field_label, &value).await
            }
            PlannedAction::CreateIssue {
                project_key,
                summary,
                description,
                issue_type,
            } => self.create(&project_key, &summary, &description, &issue_type).await,
            PlannedAction::Unknown => {
                warn!("operate: model proposed an unrecognized action");
                Err(AgentError::Other(
                    "I could not map that request to a supported operation.".to_string(),
                ))
            }
        }
    }
}

fn resolve_key<'a>(decoded: Option<&'a str>, context: Option<&'a str>) -> Result<&'a str, AgentError> {
    decoded
        .filter(|k| !k.is_empty())
        .or(context)
        .ok_or_else(|| AgentError::Other("No issue key in the request or conversation.".to_string()))
}

fn find_transition<'a>(transitions: &'a [Transition], requested: &str) -> Option<&'a Transition> {
    transitions.iter().find(|t| {
        t.id.eq_ignore_ascii_case(requested)
            || t.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(requested))
            || t.display_name().is_some_and(|n| n.eq_ignore_ascii_case(requested))
    })
}
