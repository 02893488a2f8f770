//! Multi-step plans and their execution
//!
//! A plan is an ordered list of agent/action steps decoded from a model
//! reply. Steps run strictly in order; each records an outcome under
//! `step_N` and later steps may reference earlier outputs with `$stepN`
//! parameter values. A failed step never stops the plan.

use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::registry::CapabilityRegistry;
use crate::error::AgentError;

/// A decoded execution plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Issue the plan operates on; falls back to the conversation's issue
    #[serde(default)]
    pub issue_key: Option<String>,

    #[serde(default, rename = "plan")]
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// One step of a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub agent: String,
    pub action: String,

    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Outcome of a single executed step
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Value(Value),
    Error(String),
}

/// Ordered step outcomes keyed `step_1` .. `step_N`
#[derive(Debug, Default)]
pub struct StepResults {
    entries: Vec<(String, StepOutcome)>,
}

impl StepResults {
    fn insert(&mut self, key: String, outcome: StepOutcome) {
        self.entries.push((key, outcome));
    }

    pub fn get(&self, key: &str) -> Option<&StepOutcome> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, o)| o)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render outcomes as a user-facing report, one line per step
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(key, outcome)| match outcome {
                StepOutcome::Value(Value::String(s)) => format!("{key}: {s}"),
                StepOutcome::Value(Value::Null) => format!("{key}: done"),
                StepOutcome::Value(v) => format!("{key}: {v}"),
                StepOutcome::Error(msg) => format!("{key}: error: {msg}"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runs plans against the capability registry
pub struct PlanExecutor {
    registry: Arc<CapabilityRegistry>,
    reference_pattern: Regex,
}

impl PlanExecutor {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            reference_pattern: Regex::new(r"^\$step(\d+)(?:\.(.+))?$").unwrap(),
        }
    }

    /// Execute every step of a plan in order
    ///
    /// Failures are recorded and execution continues with the next step.
    /// A plan with steps but no issue key produces a single error outcome.
    pub async fn execute(&self, plan: &Plan, context_key: Option<&str>) -> StepResults {
        let mut results = StepResults::default();

        let Some(issue_key) = plan.issue_key.as_deref().or(context_key) else {
            results.insert(
                "error".to_string(),
                StepOutcome::Error("No issue key in the plan or conversation.".to_string()),
            );
            return results;
        };

        for (index, step) in plan.steps.iter().enumerate() {
            let key = format!("step_{}", index + 1);
            info!(%key, agent = %step.agent, action = %step.action, "Executing step");

            let outcome = match self.registry.get(&step.agent) {
                None => {
                    warn!(agent = %step.agent, "Unknown agent");
                    StepOutcome::Error(format!("Unknown agent {}", step.agent))
                }
                Some(capability) => {
                    let parameters = self.resolve_parameters(&step.parameters, &results);
                    match capability.invoke(&step.action, issue_key, &parameters).await {
                        Ok(value) => StepOutcome::Value(value),
                        Err(AgentError::UnknownAction { action, .. }) => {
                            warn!(%action, "Unknown action");
                            StepOutcome::Error(format!("Unknown action {action}"))
                        }
                        Err(e) => StepOutcome::Error(format!("Failed {}: {e}", step.action)),
                    }
                }
            };

            results.insert(key, outcome);
        }

        results
    }

    /// Substitute `$stepN` references in parameter values
    fn resolve_parameters(&self, parameters: &Map<String, Value>, results: &StepResults) -> Map<String, Value> {
        parameters
            .iter()
            .map(|(k, v)| (k.clone(), self.resolve_value(v, results)))
            .collect()
    }

    fn resolve_value(&self, value: &Value, results: &StepResults) -> Value {
        match value {
            Value::String(s) => self.resolve_reference(s, results),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.resolve_value(v, results)).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.resolve_value(v, results)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Resolve one `$stepN[.path]` string
    ///
    /// Anything that does not resolve (forward reference, unknown step,
    /// failed step, missing path) becomes null rather than an error.
    fn resolve_reference(&self, text: &str, results: &StepResults) -> Value {
        let Some(captures) = self.reference_pattern.captures(text) else {
            return Value::String(text.to_string());
        };

        let step_number = &captures[1];
        let outcome = match results.get(&format!("step_{step_number}")) {
            Some(StepOutcome::Value(v)) => v.clone(),
            Some(StepOutcome::Error(_)) | None => return Value::Null,
        };

        let Some(path) = captures.get(2) else {
            return outcome;
        };

        // String outputs may carry JSON worth traversing into
        let root = match &outcome {
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(parsed) => parsed,
                Err(_) => return Value::Null,
            },
            other => other.clone(),
        };

        let mut current = &root;
        for segment in path.as_str().split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => return Value::Null,
            }
        }
        current.clone()
    }
}
