//! Capability agents
//!
//! Each agent owns one capability (insight, validation, operations, test
//! generation, issue creation, planning) and receives its collaborators
//! through its constructor. Structured model replies go through a single
//! schema-checked decode in [`decode_reply`].

mod creation;
mod insight;
mod operations;
mod planning;
mod testgen;
mod validator;

pub use creation::{CreationAgent, IssueDraft};
pub use insight::InsightAgent;
pub use operations::{OperationsAgent, PlannedAction};
pub use planning::PlanningAgent;
pub use testgen::TestGenAgent;
pub use validator::{ValidationReport, ValidatorAgent};

use serde::de::DeserializeOwned;

use crate::error::AgentError;

/// Strip a surrounding markdown code fence, if present
///
/// Models frequently wrap JSON replies in ``` fences even when told not
/// to. Only a fence at the very start and end is removed; anything else
/// is left for the decoder to reject.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };

    // Drop an optional language tag on the opening fence
    match inner.split_once('\n') {
        Some((first_line, body)) if !first_line.trim().is_empty() && !first_line.contains('{') => body.trim(),
        _ => inner.trim(),
    }
}

/// Decode a structured model reply into `T`
///
/// One decode, one failure mode: anything that does not match the expected
/// shape becomes [`AgentError::Decode`] naming what was being parsed.
pub(crate) fn decode_reply<T: DeserializeOwned>(what: &'static str, text: &str) -> Result<T, AgentError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned).map_err(|e| AgentError::Decode {
        what,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_strip_plain_fence() {
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_fence_with_language_tag() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_unfenced_text_unchanged() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_unterminated_fence_left_alone() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}"), "```json\n{\"a\": 1}");
    }

    #[test]
    fn test_decode_reply_ok() {
        let value: Value = decode_reply("test payload", "```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_decode_reply_names_payload() {
        let err = decode_reply::<Value>("validation report", "not json").unwrap_err();
        assert!(err.to_string().contains("validation report"));
    }
}
