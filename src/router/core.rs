//! The router
//!
//! One entry point, `ask`, owns a whole conversational turn: the
//! confirmation gate, forget directives, issue-reference tracking, intent
//! classification, dispatch to the capability agents, error mapping, and
//! the transcript. Configuration errors propagate; everything else comes
//! back as a user-facing reply.

use std::sync::Arc;

use tracing::{debug, info};

use super::confirm::{ConfirmationGate, PendingConfirmation};
use super::extract::IssueReferenceExtractor;
use super::intent::{Intent, IntentClassifier};
use super::plan::PlanExecutor;
use super::registry::CapabilityRegistry;
use super::session::SessionContext;
use crate::agents::{CreationAgent, InsightAgent, OperationsAgent, PlanningAgent, TestGenAgent, ValidatorAgent};
use crate::config::Config;
use crate::error::AgentError;
use crate::jira::{TrackerClient, TrackerError};
use crate::llm::LlmClient;
use crate::prompts::PromptLoader;

const NO_ISSUE_REPLY: &str = "Which issue are you asking about? Mention a key like PROJ-123.";

/// Routes questions to capability agents and keeps conversation state
pub struct Router {
    projects: Vec<String>,
    confidence_threshold: f64,
    write_comments: bool,
    require_confirmation: bool,

    classifier: IntentClassifier,
    extractor: IssueReferenceExtractor,
    session: SessionContext,
    gate: ConfirmationGate,
    executor: PlanExecutor,

    planner: PlanningAgent,
    ops: Arc<OperationsAgent>,
    insight: Arc<InsightAgent>,
    validator: Arc<ValidatorAgent>,
    testgen: Arc<TestGenAgent>,
    creation: Arc<CreationAgent>,
}

impl Router {
    /// Wire up the full agent stack from configuration
    pub fn new(config: &Config, llm: Arc<dyn LlmClient>, tracker: Arc<dyn TrackerClient>) -> Result<Self, AgentError> {
        let prompts = Arc::new(PromptLoader::new(config.router.prompt_dir.clone()));
        let max_tokens = config.llm.max_tokens;

        let ops = Arc::new(OperationsAgent::new(
            llm.clone(),
            tracker.clone(),
            prompts.clone(),
            max_tokens,
        ));
        let insight = Arc::new(InsightAgent::new(
            llm.clone(),
            tracker.clone(),
            prompts.clone(),
            max_tokens,
        ));
        let validator = Arc::new(ValidatorAgent::new(
            llm.clone(),
            tracker.clone(),
            prompts.clone(),
            max_tokens,
        ));
        let testgen = Arc::new(TestGenAgent::new(
            llm.clone(),
            tracker.clone(),
            prompts.clone(),
            max_tokens,
        ));
        let creation = Arc::new(CreationAgent::new(llm.clone(), tracker, prompts.clone(), max_tokens));

        let registry = Arc::new(CapabilityRegistry::standard(
            ops.clone(),
            insight.clone(),
            validator.clone(),
            testgen.clone(),
            creation.clone(),
        ));

        let classifier = IntentClassifier::new(
            llm.clone(),
            prompts.clone(),
            max_tokens,
            config.router.followup_word_limit,
        )?;

        Ok(Self {
            projects: config.router.projects.clone(),
            confidence_threshold: config.router.confidence_threshold,
            write_comments: config.router.write_comments,
            require_confirmation: config.router.require_confirmation,
            classifier,
            extractor: IssueReferenceExtractor::new(&config.router.projects)?,
            session: SessionContext::new(config.router.max_history),
            gate: ConfirmationGate::default(),
            executor: PlanExecutor::new(registry),
            planner: PlanningAgent::new(llm, prompts, max_tokens),
            ops,
            insight,
            validator,
            testgen,
            creation,
        })
    }

    /// Answer one user turn
    ///
    /// Only configuration errors escape as `Err`; operational failures are
    /// mapped to a reply the user can act on.
    pub async fn ask(&mut self, question: &str) -> Result<String, AgentError> {
        let question = question.trim();

        // A pending confirmation always claims the next turn, whatever it
        // says; only an affirmative reply commits the parked write
        if self.gate.is_pending() {
            let answer = self.resolve_confirmation(question).await?;
            return Ok(self.record(question, answer));
        }

        if question.is_empty() {
            return Ok("Ask me something about an issue.".to_string());
        }

        if SessionContext::is_forget(question) {
            info!("Forget directive received");
            self.session.clear();
            return Ok("Okay, I've dropped our conversation so far.".to_string());
        }

        if let Some(key) = self.extractor.extract(question) {
            self.session.set_issue(key);
        }

        let (intent, confidence) = match self
            .classifier
            .classify_with_confidence(question, self.session.history())
            .await
        {
            Ok(result) => result,
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => return Ok(self.record(question, user_message(e))),
        };

        // Low-confidence mutations are downgraded to a read-only answer
        let intent = if confidence < self.confidence_threshold {
            debug!(?intent, confidence, "Confidence below threshold, answering read-only");
            Intent::Insight
        } else {
            intent
        };

        let answer = match self.dispatch(intent, question).await {
            Ok(answer) => answer,
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => user_message(e),
        };

        Ok(self.record(question, answer))
    }

    /// Transcript lines recorded so far
    pub fn history(&self) -> &[String] {
        self.session.history()
    }

    /// Append the exchange to the transcript, relaying any reset notice
    fn record(&mut self, question: &str, answer: String) -> String {
        match self.session.save(question, &answer) {
            Some(notice) => format!("{notice}\n\n{answer}"),
            None => answer,
        }
    }

    async fn resolve_confirmation(&mut self, reply: &str) -> Result<String, AgentError> {
        match self.gate.resolve(reply) {
            Some(pending) => match self.ops.add_comment(&pending.issue_key, &pending.payload).await {
                Ok(message) => Ok(message),
                Err(e) if e.is_configuration() => Err(e),
                Err(e) => Ok(user_message(e)),
            },
            None => Ok("Okay, I won't post the comment.".to_string()),
        }
    }

    async fn dispatch(&mut self, intent: Intent, question: &str) -> Result<String, AgentError> {
        match intent {
            Intent::Insight | Intent::Unknown => {
                let Some(key) = self.session.current_issue().map(str::to_string) else {
                    return Ok(NO_ISSUE_REPLY.to_string());
                };
                self.insight.answer(&key, question).await
            }
            Intent::Validate => self.validate().await,
            Intent::Operate => self.operate(question).await,
            Intent::Test => {
                let Some(key) = self.session.current_issue().map(str::to_string) else {
                    return Ok(NO_ISSUE_REPLY.to_string());
                };
                self.testgen.create_test_cases(&key, Some(question)).await
            }
            Intent::Create => {
                let project = match self.choose_project(question) {
                    Some(project) => project,
                    None => return Ok("No projects are configured, so I can't create issues.".to_string()),
                };
                self.creation.create_from_request(&project, question).await
            }
        }
    }

    async fn validate(&mut self) -> Result<String, AgentError> {
        let Some(key) = self.session.current_issue().map(str::to_string) else {
            return Ok(NO_ISSUE_REPLY.to_string());
        };

        let report = self.validator.validate(&key).await?;
        let mut answer = report.assessment;

        let Some(comment) = report
            .suggested_comment
            .filter(|c| report.api_related && !c.trim().is_empty())
        else {
            return Ok(answer);
        };

        if !self.write_comments {
            answer.push_str(&format!("\n\nSuggested comment:\n{comment}"));
        } else if self.require_confirmation {
            let prompt = format!("Shall I post this comment to {key}? (yes/no)");
            answer.push_str(&format!("\n\nSuggested comment:\n{comment}\n\n{prompt}"));
            self.gate.request(PendingConfirmation {
                issue_key: key,
                payload: comment,
                prompt,
            });
        } else {
            let posted = self.ops.add_comment(&key, &comment).await?;
            answer.push_str(&format!("\n\n{posted}"));
        }

        Ok(answer)
    }

    async fn operate(&mut self, question: &str) -> Result<String, AgentError> {
        let context_key = self.session.current_issue().map(str::to_string);

        let plan = self.planner.generate_plan(context_key.as_deref(), question).await?;
        if plan.is_empty() {
            debug!("operate: no plan, trying a single operation");
            return self.ops.operate(context_key.as_deref(), question).await;
        }

        if let Some(key) = &plan.issue_key {
            self.session.set_issue(key.clone());
        }

        let results = self.executor.execute(&plan, context_key.as_deref()).await;
        Ok(results.render())
    }

    /// Pick the project for a new issue
    ///
    /// A configured project key named in the question wins; otherwise the
    /// first configured project is used.
    fn choose_project(&self, question: &str) -> Option<String> {
        question
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .find_map(|token| {
                self.projects
                    .iter()
                    .find(|p| p.eq_ignore_ascii_case(token))
                    .cloned()
            })
            .or_else(|| self.projects.first().cloned())
    }
}

/// Map an operational failure to a reply
fn user_message(error: AgentError) -> String {
    match error {
        AgentError::Tracker(TrackerError::NotFound { key }) => {
            format!("I couldn't find {key} in the tracker.")
        }
        AgentError::Tracker(TrackerError::PermissionDenied { key }) => {
            format!("I'm not allowed to access {key}.")
        }
        AgentError::Tracker(e) => format!("The tracker request failed: {e}"),
        AgentError::Provider(_) => "The language model is unavailable right now; please try again.".to_string(),
        AgentError::Decode { what, .. } => {
            format!("I couldn't make sense of the model's {what}. Please try rephrasing.")
        }
        AgentError::UnknownAction { agent, action } => {
            format!("'{action}' isn't something the {agent} capability can do.")
        }
        AgentError::Configuration(message) | AgentError::Other(message) => message,
    }
}
