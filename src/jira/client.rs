//! TrackerClient trait and Jira REST implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::error::TrackerError;
use super::types::{FieldMeta, Transition};
use crate::config::JiraConfig;

/// Client for the tracked-item store
///
/// The router and capability agents only ever see this trait; the concrete
/// Jira client is injected at construction. Tests substitute an in-memory
/// implementation.
#[async_trait]
pub trait TrackerClient: Send + Sync {
    /// Fetch the raw issue payload
    async fn get_issue(&self, key: &str) -> Result<Value, TrackerError>;

    /// Fetch the issue changelog
    async fn get_changelog(&self, key: &str) -> Result<Value, TrackerError>;

    /// List workflow transitions currently available on the issue
    async fn get_transitions(&self, key: &str) -> Result<Vec<Transition>, TrackerError>;

    /// Add a comment; returns the created comment payload
    async fn add_comment(&self, key: &str, body: &str) -> Result<Value, TrackerError>;

    /// Create an issue; returns the creation payload (contains the new key)
    async fn create_issue(
        &self,
        project: &str,
        summary: &str,
        description: &str,
        issue_type: &str,
    ) -> Result<Value, TrackerError>;

    /// Update issue fields from a `{field_id: value}` object
    async fn update_fields(&self, key: &str, fields: &Value) -> Result<Value, TrackerError>;

    /// Execute a workflow transition by id
    async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<(), TrackerError>;

    /// List field metadata (for label -> id resolution)
    async fn list_fields(&self) -> Result<Vec<FieldMeta>, TrackerError>;
}

/// Jira REST API client
pub struct JiraClient {
    base_url: String,
    api_token: String,
    http: Client,
}

impl JiraClient {
    /// Create a new client from configuration
    ///
    /// Reads the API token from the environment variable named in the config.
    pub fn from_config(config: &JiraConfig) -> Result<Self, TrackerError> {
        let api_token = config.get_api_token().map_err(|e| TrackerError::Api {
            status: 0,
            message: e.to_string(),
        })?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/api/3/{}", self.base_url, path)
    }

    async fn get(&self, path: &str, key: &str) -> Result<Value, TrackerError> {
        let url = self.url(path);
        debug!(%url, "get: called");
        let response = self.http.get(&url).bearer_auth(&self.api_token).send().await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TrackerError::from_status(status, key, message));
        }

        Ok(response.json().await?)
    }

    async fn post(&self, path: &str, key: &str, body: &Value) -> Result<Value, TrackerError> {
        let url = self.url(path);
        debug!(%url, "post: called");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TrackerError::from_status(status, key, message));
        }

        // Transition and update endpoints return 204 with an empty body
        if status == 204 {
            return Ok(Value::Null);
        }

        Ok(response.json().await?)
    }

    async fn put(&self, path: &str, key: &str, body: &Value) -> Result<Value, TrackerError> {
        let url = self.url(path);
        debug!(%url, "put: called");
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TrackerError::from_status(status, key, message));
        }

        if status == 204 {
            return Ok(Value::Null);
        }

        Ok(response.json().await?)
    }

    /// Build the comment body payload (ADF paragraph)
    fn comment_body(text: &str) -> Value {
        serde_json::json!({
            "body": {
                "type": "doc",
                "version": 1,
                "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": text}]}
                ]
            }
        })
    }

    /// Build the issue creation payload
    fn create_body(project: &str, summary: &str, description: &str, issue_type: &str) -> Value {
        serde_json::json!({
            "fields": {
                "project": {"key": project},
                "summary": summary,
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [
                        {"type": "paragraph", "content": [{"type": "text", "text": description}]}
                    ]
                },
                "issuetype": {"name": issue_type}
            }
        })
    }
}

#[async_trait]
impl TrackerClient for JiraClient {
    async fn get_issue(&self, key: &str) -> Result<Value, TrackerError> {
        info!(%key, "Fetching issue");
        self.get(&format!("issue/{key}"), key).await
    }

    async fn get_changelog(&self, key: &str) -> Result<Value, TrackerError> {
        info!(%key, "Fetching changelog");
        self.get(&format!("issue/{key}/changelog"), key).await
    }

    async fn get_transitions(&self, key: &str) -> Result<Vec<Transition>, TrackerError> {
        let payload = self.get(&format!("issue/{key}/transitions"), key).await?;
        let transitions = payload.get("transitions").cloned().unwrap_or(Value::Array(vec![]));
        Ok(serde_json::from_value(transitions)?)
    }

    async fn add_comment(&self, key: &str, body: &str) -> Result<Value, TrackerError> {
        info!(%key, "Adding comment");
        self.post(&format!("issue/{key}/comment"), key, &Self::comment_body(body))
            .await
    }

    async fn create_issue(
        &self,
        project: &str,
        summary: &str,
        description: &str,
        issue_type: &str,
    ) -> Result<Value, TrackerError> {
        info!(%project, "Creating issue");
        self.post("issue", project, &Self::create_body(project, summary, description, issue_type))
            .await
    }

    async fn update_fields(&self, key: &str, fields: &Value) -> Result<Value, TrackerError> {
        info!(%key, "Updating fields");
        self.put(
            &format!("issue/{key}"),
            key,
            &serde_json::json!({"fields": fields}),
        )
        .await
    }

    async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<(), TrackerError> {
        info!(%key, %transition_id, "Transitioning issue");
        self.post(
            &format!("issue/{key}/transitions"),
            key,
            &serde_json::json!({"transition": {"id": transition_id}}),
        )
        .await?;
        Ok(())
    }

    async fn list_fields(&self) -> Result<Vec<FieldMeta>, TrackerError> {
        let payload = self.get("field", "").await?;
        Ok(serde_json::from_value(payload)?)
    }
}
