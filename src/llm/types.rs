//! LLM request/response types
//!
//! Modeled on the provider chat APIs but kept provider-agnostic. Every
//! request is a one-shot completion; no conversation state lives in the
//! client.

use serde::{Deserialize, Serialize};

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt (rendered from a Handlebars template)
    pub system_prompt: String,

    /// User/assistant messages
    pub messages: Vec<Message>,

    /// Max tokens for the response
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Build a single-turn request from a rendered prompt
    pub fn single(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system_prompt: String::new(),
            messages: vec![Message::user(prompt)],
            max_tokens,
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content of the reply
    pub content: String,

    /// Token usage for cost tracking
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Build a plain-text response (used by tests and mocks)
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage for cost tracking
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_user() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn test_single_request() {
        let req = CompletionRequest::single("classify this", 256);
        assert!(req.system_prompt.is_empty());
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.max_tokens, 256);
    }
}
