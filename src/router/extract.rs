//! Issue key extraction from free text

use regex::Regex;

use crate::error::AgentError;

/// Finds issue keys like `PROJ-123` in a question
///
/// With configured project prefixes only those are matched; without any,
/// a generic `<letters><digits>` key pattern is used. Matching is
/// case-insensitive and the extracted key is uppercased.
#[derive(Debug, Clone)]
pub struct IssueReferenceExtractor {
    pattern: Regex,
}

impl IssueReferenceExtractor {
    pub fn new(projects: &[String]) -> Result<Self, AgentError> {
        let pattern = if projects.is_empty() {
            r"(?i)\b[A-Za-z][A-Za-z0-9]*-\d+\b".to_string()
        } else {
            let prefixes: Vec<String> = projects.iter().map(|p| regex::escape(p)).collect();
            format!(r"(?i)\b(?:{})-\d+\b", prefixes.join("|"))
        };

        let pattern = Regex::new(&pattern)
            .map_err(|e| AgentError::Configuration(format!("Bad project key pattern: {e}")))?;
        Ok(Self { pattern })
    }

    /// First issue key in the text, uppercased
    pub fn extract(&self, text: &str) -> Option<String> {
        self.pattern.find(text).map(|m| m.as_str().to_uppercase())
    }
}
