//! Jira data types and document helpers

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A workflow transition available on an issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub to: Option<TransitionTarget>,
}

impl Transition {
    /// Display name for this transition, falling back to the target status
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.to.as_ref().map(|t| t.name.as_str()))
    }
}

/// Target status of a transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionTarget {
    pub name: String,
}

/// Field metadata from the tracker (id + human label)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMeta {
    pub id: String,
    pub name: String,
}

/// Extract plain text from an Atlassian Document Format value
///
/// Descriptions and comment bodies arrive as nested `{type, content, text}`
/// structures; older API versions return plain strings. Both are handled.
pub fn extract_plain_text(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(extract_plain_text).collect(),
        Value::Object(map) => {
            let mut text = map.get("text").and_then(Value::as_str).unwrap_or("").to_string();
            if let Some(content) = map.get("content") {
                text.push_str(&extract_plain_text(content));
            }
            text
        }
        _ => String::new(),
    }
}

/// Pull summary and plain-text description out of a raw issue payload
pub fn issue_text(issue: &Value) -> (String, String) {
    let fields = issue.get("fields").cloned().unwrap_or(Value::Null);
    let summary = fields
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let description = fields
        .get("description")
        .map(extract_plain_text)
        .unwrap_or_default();
    (summary, description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_plain_text_string() {
        assert_eq!(extract_plain_text(&json!("hello")), "hello");
    }

    #[test]
    fn test_extract_plain_text_adf() {
        let doc = json!({
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Implement the "},
                    {"type": "text", "text": "login endpoint"}
                ]}
            ]
        });
        assert_eq!(extract_plain_text(&doc), "Implement the login endpoint");
    }

    #[test]
    fn test_extract_plain_text_null() {
        assert_eq!(extract_plain_text(&Value::Null), "");
    }

    #[test]
    fn test_issue_text() {
        let issue = json!({
            "key": "PROJ-7",
            "fields": {"summary": "Add login", "description": "POST /login endpoint"}
        });
        let (summary, description) = issue_text(&issue);
        assert_eq!(summary, "Add login");
        assert_eq!(description, "POST /login endpoint");
    }

    #[test]
    fn test_transition_display_name_falls_back_to_target() {
        let t: Transition = serde_json::from_value(json!({
            "id": "31",
            "to": {"name": "Done"}
        }))
        .unwrap();
        assert_eq!(t.display_name(), Some("Done"));
    }
}
