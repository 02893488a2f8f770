//! Per-conversation state
//!
//! Tracks the issue under discussion and a bounded transcript. When the
//! transcript reaches twice the configured window it is cleared before
//! the next exchange is appended, and the caller gets a notice to relay.

use tracing::info;

/// Notice returned when the transcript is reset
const RESET_NOTICE: &str = "Our conversation was getting long, so I'm starting a new conversation.";

/// Conversation state for one session
#[derive(Debug)]
pub struct SessionContext {
    current_issue: Option<String>,
    chat_history: Vec<String>,
    max_history: usize,
}

impl SessionContext {
    pub fn new(max_history: usize) -> Self {
        Self {
            current_issue: None,
            chat_history: Vec::new(),
            max_history,
        }
    }

    pub fn current_issue(&self) -> Option<&str> {
        self.current_issue.as_deref()
    }

    pub fn set_issue(&mut self, key: String) {
        if self.current_issue.as_deref() != Some(key.as_str()) {
            info!(%key, "Switching to issue");
        }
        self.current_issue = Some(key);
    }

    /// Whether the question is a request to drop all conversation state
    pub fn is_forget(question: &str) -> bool {
        let lowered = question.trim().to_lowercase();
        lowered == "forget" || lowered.starts_with("forget ")
    }

    /// Whether the question mentions a forget directive anywhere in the text
    pub fn mentions_forget(question: &str) -> bool {
        question.to_lowercase().contains("forget")
    }

    /// Drop the transcript and the current issue
    pub fn clear(&mut self) {
        self.current_issue = None;
        self.chat_history.clear();
    }

    pub fn history(&self) -> &[String] {
        &self.chat_history
    }

    /// Record one exchange
    ///
    /// A question that mentions a forget directive drops the current issue
    /// but the exchange is still recorded. Returns a notice when the
    /// transcript was reset first; the caller relays it to the user once.
    pub fn save(&mut self, question: &str, answer: &str) -> Option<String> {
        if Self::mentions_forget(question) {
            info!("Forget mention, dropping the current issue");
            self.current_issue = None;
        }

        let notice = if self.chat_history.len() >= 2 * self.max_history {
            info!(lines = self.chat_history.len(), "Resetting conversation transcript");
            self.chat_history.clear();
            Some(RESET_NOTICE.to_string())
        } else {
            None
        };

        self.chat_history.push(format!("Human: {question}"));
        self.chat_history.push(format!("AI: {answer}"));
        notice
    }
}
