//! Intent classification
//!
//! Every question gets a plain classification; short questions also get a
//! context-aware one that sees the recent transcript. Agreement between
//! the two sets the confidence score the router uses to decide whether to
//! trust a mutating intent.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::error::AgentError;
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;

/// What the user wants done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Validate,
    Operate,
    Insight,
    Test,
    Create,
    Unknown,
}

impl Intent {
    /// Parse a model reply; extra prose after the label is tolerated
    pub fn from_label(label: &str) -> Self {
        let first = label.trim().split_whitespace().next().unwrap_or("");
        match first.to_uppercase().trim_end_matches([':', '.', ',']) {
            "VALIDATE" => Intent::Validate,
            "OPERATE" => Intent::Operate,
            "INSIGHT" => Intent::Insight,
            "TEST" => Intent::Test,
            "CREATE" => Intent::Create,
            _ => Intent::Unknown,
        }
    }
}

/// How many transcript lines the context-aware classification sees
const CONTEXT_LINES: usize = 6;

/// Classifies questions into intents with a confidence score
pub struct IntentClassifier {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
    followup_word_limit: usize,
}

impl IntentClassifier {
    /// Build a classifier, checking the prompt exists up front
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptLoader>,
        max_tokens: u32,
        followup_word_limit: usize,
    ) -> Result<Self, AgentError> {
        if !prompts.has("intent") {
            return Err(AgentError::Configuration(
                "Intent classification prompt is missing".to_string(),
            ));
        }

        Ok(Self {
            llm,
            prompts,
            max_tokens,
            followup_word_limit,
        })
    }

    /// Classify without conversation context
    pub async fn classify(&self, question: &str) -> Result<Intent, AgentError> {
        self.run(question, "").await
    }

    /// Classify with the recent transcript included
    pub async fn classify_with_context(&self, question: &str, history: &[String]) -> Result<Intent, AgentError> {
        let tail = history.len().saturating_sub(CONTEXT_LINES);
        self.run(question, &history[tail..].join("\n")).await
    }

    /// Classify and score
    ///
    /// Short questions are re-classified with the transcript. Agreement
    /// scores 0.9; disagreement 0.7 with the context-aware label winning;
    /// one side unreadable 0.6; both unreadable 0.5 and `Unknown`.
    pub async fn classify_with_confidence(
        &self,
        question: &str,
        history: &[String],
    ) -> Result<(Intent, f64), AgentError> {
        let plain = self.classify(question).await?;

        let is_followup = question.split_whitespace().count() <= self.followup_word_limit && !history.is_empty();
        let contextual = if is_followup {
            self.classify_with_context(question, history).await?
        } else {
            plain
        };

        let scored = match (plain, contextual) {
            (Intent::Unknown, Intent::Unknown) => (Intent::Unknown, 0.5),
            (known, Intent::Unknown) => (known, 0.6),
            (Intent::Unknown, known) => (known, 0.6),
            (a, b) if a == b => (a, 0.9),
            (_, contextual) => (contextual, 0.7),
        };

        debug!(?plain, ?contextual, intent = ?scored.0, confidence = scored.1, "classify_with_confidence");
        Ok(scored)
    }

    async fn run(&self, question: &str, history: &str) -> Result<Intent, AgentError> {
        let prompt = self
            .prompts
            .render("intent", &json!({"question": question, "history": history}))?;

        let response = self
            .llm
            .complete(CompletionRequest::single(prompt, self.max_tokens))
            .await?;

        Ok(Intent::from_label(&response.content))
    }
}
