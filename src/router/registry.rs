//! Closed capability registry
//!
//! Plan steps name capabilities by string. The registry is a fixed map
//! built at startup; nothing is discovered dynamically. A name miss is
//! reported by the executor, an action miss by the capability.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::agents::{CreationAgent, InsightAgent, OperationsAgent, TestGenAgent, ValidatorAgent};
use crate::error::AgentError;

/// One named capability invokable from a plan step
#[async_trait]
pub trait Capability: Send + Sync {
    /// Registry name plan steps use
    fn name(&self) -> &'static str;

    /// Actions this capability answers to
    fn actions(&self) -> &'static [&'static str];

    /// Run one action against an issue
    async fn invoke(&self, action: &str, issue_key: &str, parameters: &Map<String, Value>)
    -> Result<Value, AgentError>;
}

/// Fixed name-to-capability map
#[derive(Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    /// Build the standard registry over the five capability agents
    pub fn standard(
        ops: Arc<OperationsAgent>,
        insight: Arc<InsightAgent>,
        validator: Arc<ValidatorAgent>,
        testgen: Arc<TestGenAgent>,
        creation: Arc<CreationAgent>,
    ) -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(OpsCapability { agent: ops }));
        registry.register(Arc::new(InsightCapability { agent: insight }));
        registry.register(Arc::new(ValidatorCapability { agent: validator }));
        registry.register(Arc::new(TestGenCapability { agent: testgen }));
        registry.register(Arc::new(CreationCapability { agent: creation }));
        registry
    }

    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        self.capabilities.insert(capability.name().to_string(), capability);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Capability>> {
        self.capabilities.get(name)
    }
}

fn unknown(agent: &str, action: &str) -> AgentError {
    AgentError::UnknownAction {
        agent: agent.to_string(),
        action: action.to_string(),
    }
}

/// Required string parameter; non-string values are stringified
fn text_param(parameters: &Map<String, Value>, name: &str) -> Result<String, AgentError> {
    let value = parameters
        .get(name)
        .ok_or_else(|| AgentError::Other(format!("Missing parameter '{name}'")))?;
    Ok(as_text(value))
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

struct OpsCapability {
    agent: Arc<OperationsAgent>,
}

#[async_trait]
impl Capability for OpsCapability {
    fn name(&self) -> &'static str {
        "ops"
    }

    fn actions(&self) -> &'static [&'static str] {
        &[
            "add_comment",
            "transition_issue",
            "update_fields",
            "fill_field_by_label",
            "create_issue",
        ]
    }

    async fn invoke(
        &self,
        action: &str,
        issue_key: &str,
        parameters: &Map<String, Value>,
    ) -> Result<Value, AgentError> {
        let message = match action {
            "add_comment" => {
                let comment = text_param(parameters, "comment")?;
                self.agent.add_comment(issue_key, &comment).await?
            }
            "transition_issue" => {
                let transition = text_param(parameters, "transition")
                    .or_else(|_| text_param(parameters, "transition_name"))?;
                self.agent.transition(issue_key, &transition).await?
            }
            "update_fields" => {
                let fields = parameters
                    .get("fields")
                    .cloned()
                    .ok_or_else(|| AgentError::Other("Missing parameter 'fields'".to_string()))?;
                self.agent.update_fields(issue_key, &fields).await?
            }
            "fill_field_by_label" => {
                let label = text_param(parameters, "field_label")?;
                let value = parameters.get("value").cloned().unwrap_or(Value::Null);
                self.agent.fill_field_by_label(issue_key, &label, &value).await?
            }
            "create_issue" => {
                let project = text_param(parameters, "project_key")?;
                let summary = text_param(parameters, "summary")?;
                let description = parameters.get("description").map(as_text).unwrap_or_default();
                let issue_type = parameters
                    .get("issue_type")
                    .map(as_text)
                    .unwrap_or_else(|| "Task".to_string());
                self.agent.create(&project, &summary, &description, &issue_type).await?
            }
            other => return Err(unknown(self.name(), other)),
        };
        Ok(Value::String(message))
    }
}

struct InsightCapability {
    agent: Arc<InsightAgent>,
}

#[async_trait]
impl Capability for InsightCapability {
    fn name(&self) -> &'static str {
        "insight"
    }

    fn actions(&self) -> &'static [&'static str] {
        &["answer", "summarize"]
    }

    async fn invoke(
        &self,
        action: &str,
        issue_key: &str,
        parameters: &Map<String, Value>,
    ) -> Result<Value, AgentError> {
        let message = match action {
            "answer" => {
                let question = text_param(parameters, "question")?;
                self.agent.answer(issue_key, &question).await?
            }
            "summarize" => self.agent.summarize(issue_key).await?,
            other => return Err(unknown(self.name(), other)),
        };
        Ok(Value::String(message))
    }
}

struct ValidatorCapability {
    agent: Arc<ValidatorAgent>,
}

#[async_trait]
impl Capability for ValidatorCapability {
    fn name(&self) -> &'static str {
        "validator"
    }

    fn actions(&self) -> &'static [&'static str] {
        &["validate"]
    }

    async fn invoke(
        &self,
        action: &str,
        issue_key: &str,
        _parameters: &Map<String, Value>,
    ) -> Result<Value, AgentError> {
        match action {
            "validate" => {
                let report = self.agent.validate(issue_key).await?;
                serde_json::to_value(&report).map_err(|e| AgentError::Other(e.to_string()))
            }
            other => Err(unknown(self.name(), other)),
        }
    }
}

struct TestGenCapability {
    agent: Arc<TestGenAgent>,
}

#[async_trait]
impl Capability for TestGenCapability {
    fn name(&self) -> &'static str {
        "testgen"
    }

    fn actions(&self) -> &'static [&'static str] {
        &["create_test_cases"]
    }

    async fn invoke(
        &self,
        action: &str,
        issue_key: &str,
        parameters: &Map<String, Value>,
    ) -> Result<Value, AgentError> {
        match action {
            "create_test_cases" => {
                let question = parameters.get("question").map(as_text);
                let cases = self.agent.create_test_cases(issue_key, question.as_deref()).await?;
                Ok(Value::String(cases))
            }
            other => Err(unknown(self.name(), other)),
        }
    }
}

struct CreationCapability {
    agent: Arc<CreationAgent>,
}

#[async_trait]
impl Capability for CreationCapability {
    fn name(&self) -> &'static str {
        "create"
    }

    fn actions(&self) -> &'static [&'static str] {
        &["create_issue"]
    }

    async fn invoke(
        &self,
        action: &str,
        _issue_key: &str,
        parameters: &Map<String, Value>,
    ) -> Result<Value, AgentError> {
        match action {
            "create_issue" => {
                let project = text_param(parameters, "project_key")?;
                let request = text_param(parameters, "request")?;
                let message = self.agent.create_from_request(&project, &request).await?;
                Ok(Value::String(message))
            }
            other => Err(unknown(self.name(), other)),
        }
    }
}
