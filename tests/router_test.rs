//! End-to-end router tests over scripted collaborators
//!
//! The LLM is a scripted double that returns queued replies in order; the
//! tracker is an in-memory store that records every mutation. Together
//! they exercise whole conversational turns through `Router::ask`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use issuepilot::config::Config;
use issuepilot::jira::{FieldMeta, Transition, TrackerClient};
use issuepilot::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use issuepilot::router::Router;

struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn queue(&self, replies: &[&str]) {
        let mut queued = self.replies.lock().unwrap();
        for reply in replies {
            queued.push_back(reply.to_string());
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .map(CompletionResponse::text)
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
    }
}

#[derive(Default)]
struct MemoryTracker {
    issues: HashMap<String, Value>,
    transitions: Vec<Transition>,
    comments: Mutex<Vec<(String, String)>>,
    transitioned: Mutex<Vec<(String, String)>>,
    created: Mutex<Vec<(String, String)>>,
}

impl MemoryTracker {
    fn with_issue(key: &str, summary: &str, description: &str) -> Arc<Self> {
        let mut issues = HashMap::new();
        issues.insert(
            key.to_string(),
            json!({"key": key, "fields": {"summary": summary, "description": description}}),
        );
        Arc::new(Self {
            issues,
            ..Default::default()
        })
    }

    fn comments(&self) -> Vec<(String, String)> {
        self.comments.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackerClient for MemoryTracker {
    async fn get_issue(&self, key: &str) -> Result<Value, issuepilot::jira::TrackerError> {
        self.issues
            .get(key)
            .cloned()
            .ok_or_else(|| issuepilot::jira::TrackerError::NotFound { key: key.to_string() })
    }

    async fn get_changelog(&self, _key: &str) -> Result<Value, issuepilot::jira::TrackerError> {
        Ok(json!({"values": []}))
    }

    async fn get_transitions(&self, _key: &str) -> Result<Vec<Transition>, issuepilot::jira::TrackerError> {
        Ok(self.transitions.clone())
    }

    async fn add_comment(&self, key: &str, body: &str) -> Result<Value, issuepilot::jira::TrackerError> {
        self.comments.lock().unwrap().push((key.to_string(), body.to_string()));
        Ok(json!({"id": "1"}))
    }

    async fn create_issue(
        &self,
        project: &str,
        summary: &str,
        _description: &str,
        _issue_type: &str,
    ) -> Result<Value, issuepilot::jira::TrackerError> {
        self.created.lock().unwrap().push((project.to_string(), summary.to_string()));
        Ok(json!({"key": format!("{project}-100")}))
    }

    async fn update_fields(&self, _key: &str, _fields: &Value) -> Result<Value, issuepilot::jira::TrackerError> {
        Ok(Value::Null)
    }

    async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<(), issuepilot::jira::TrackerError> {
        self.transitioned
            .lock()
            .unwrap()
            .push((key.to_string(), transition_id.to_string()));
        Ok(())
    }

    async fn list_fields(&self) -> Result<Vec<FieldMeta>, issuepilot::jira::TrackerError> {
        Ok(vec![])
    }
}

fn base_config() -> Config {
    let mut config = Config::default();
    config.router.projects = vec!["PROJ".to_string()];
    config
}

fn router(config: Config, llm: Arc<ScriptedLlm>, tracker: Arc<MemoryTracker>) -> Router {
    Router::new(&config, llm, tracker).unwrap()
}

#[tokio::test]
async fn insight_question_answers_from_the_issue() {
    let llm = ScriptedLlm::new(&["INSIGHT", "NO_HISTORY", "It adds a login endpoint."]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "Add login", "POST /login");
    let mut router = router(base_config(), llm, tracker);

    let reply = router.ask("what is PROJ-1 actually about, in short?").await.unwrap();
    assert_eq!(reply, "It adds a login endpoint.");
}

#[tokio::test]
async fn short_followup_reuses_the_remembered_issue() {
    let llm = ScriptedLlm::new(&["INSIGHT", "NO_HISTORY", "A login issue."]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "Add login", "");
    let mut router = router(base_config(), llm.clone(), tracker);

    router.ask("what is PROJ-1 actually about, in short?").await.unwrap();

    // Two classifications (plain + contextual), then the insight flow
    llm.queue(&["INSIGHT", "INSIGHT", "NO_HISTORY", "Still the login issue."]);
    let reply = router.ask("and now?").await.unwrap();
    assert_eq!(reply, "Still the login issue.");
}

#[tokio::test]
async fn plan_steps_pass_outputs_forward() {
    let plan = r#"{"issue_key": "PROJ-1", "plan": [
        {"agent": "insight", "action": "summarize"},
        {"agent": "ops", "action": "add_comment", "parameters": {"comment": "$step1"}}
    ]}"#;
    let llm = ScriptedLlm::new(&["OPERATE", plan, "A tidy summary."]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "Add login", "POST /login");
    let mut router = router(base_config(), llm, tracker.clone());

    let reply = router
        .ask("summarize PROJ-1 and then post that summary as a comment")
        .await
        .unwrap();

    assert!(reply.contains("step_1: A tidy summary."));
    assert!(reply.contains("step_2: Added comment to PROJ-1."));
    assert_eq!(
        tracker.comments(),
        vec![("PROJ-1".to_string(), "A tidy summary.".to_string())]
    );
}

#[tokio::test]
async fn unknown_agent_fails_only_its_step() {
    let plan = r#"{"issue_key": "PROJ-1", "plan": [
        {"agent": "ghost", "action": "boo"},
        {"agent": "ops", "action": "add_comment", "parameters": {"comment": "still here"}}
    ]}"#;
    let llm = ScriptedLlm::new(&["OPERATE", plan]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "Add login", "");
    let mut router = router(base_config(), llm, tracker.clone());

    let reply = router
        .ask("do the ghost thing on PROJ-1 and then leave a comment")
        .await
        .unwrap();

    assert!(reply.contains("step_1: error: Unknown agent ghost"));
    assert!(reply.contains("step_2: Added comment to PROJ-1."));
    assert_eq!(tracker.comments().len(), 1);
}

#[tokio::test]
async fn forward_reference_becomes_null_not_an_error() {
    let plan = r#"{"issue_key": "PROJ-1", "plan": [
        {"agent": "ops", "action": "add_comment", "parameters": {"comment": "$step9"}}
    ]}"#;
    let llm = ScriptedLlm::new(&["OPERATE", plan]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "Add login", "");
    let mut router = router(base_config(), llm, tracker.clone());

    let reply = router
        .ask("post whatever step nine says on PROJ-1 right now")
        .await
        .unwrap();

    // The unresolved reference empties the comment; the step still succeeds
    assert!(reply.contains("step_1: Added comment to PROJ-1."));
    assert_eq!(tracker.comments(), vec![("PROJ-1".to_string(), String::new())]);
}

#[tokio::test]
async fn path_into_plain_string_result_does_not_transition() {
    let plan = r#"{"issue_key": "PROJ-1", "plan": [
        {"agent": "insight", "action": "summarize"},
        {"agent": "ops", "action": "transition_issue", "parameters": {"transition": "$step1.status"}}
    ]}"#;
    let llm = ScriptedLlm::new(&["OPERATE", plan, "just prose, not json", "NONE"]);

    let mut tracker = MemoryTracker::default();
    tracker.issues.insert(
        "PROJ-1".to_string(),
        json!({"key": "PROJ-1", "fields": {"summary": "Add login", "description": ""}}),
    );
    tracker.transitions = vec![Transition {
        id: "31".to_string(),
        name: Some("Done".to_string()),
        to: None,
    }];
    let tracker = Arc::new(tracker);
    let mut router = router(base_config(), llm, tracker.clone());

    let reply = router
        .ask("summarize PROJ-1 and then move it to whatever status that says")
        .await
        .unwrap();

    // The dotted path into a non-JSON string resolves to null; the step
    // runs with an empty transition name and matches nothing
    assert!(reply.contains("step_2: No transition named ''"));
    assert!(tracker.transitioned.lock().unwrap().is_empty());
}

#[tokio::test]
async fn suggested_comment_waits_for_confirmation() {
    let report = r#"{"assessment": "The contract is missing error codes.",
        "api_related": true,
        "suggested_comment": "Please add 401 and 422 responses."}"#;
    let llm = ScriptedLlm::new(&["VALIDATE", report]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "POST /login", "Login endpoint");

    let mut config = base_config();
    config.router.write_comments = true;
    config.router.require_confirmation = true;
    let mut router = router(config, llm.clone(), tracker.clone());

    let reply = router.ask("validate PROJ-1").await.unwrap();
    assert!(reply.contains("missing error codes"));
    assert!(reply.contains("Shall I post this comment"));
    assert!(tracker.comments().is_empty());

    // The reply is consumed by the gate; no model call happens
    let calls_before = llm.calls();
    let reply = router.ask("yes").await.unwrap();
    assert_eq!(llm.calls(), calls_before);
    assert!(reply.contains("Added comment to PROJ-1."));
    assert_eq!(
        tracker.comments(),
        vec![("PROJ-1".to_string(), "Please add 401 and 422 responses.".to_string())]
    );
}

#[tokio::test]
async fn declined_confirmation_posts_nothing() {
    let report = r#"{"assessment": "Fine overall.",
        "api_related": true,
        "suggested_comment": "Consider pagination."}"#;
    let llm = ScriptedLlm::new(&["VALIDATE", report]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "GET /users", "");

    let mut config = base_config();
    config.router.write_comments = true;
    let mut router = router(config, llm, tracker.clone());

    router.ask("validate PROJ-1").await.unwrap();
    let reply = router.ask("no, leave it").await.unwrap();

    assert!(reply.contains("won't post"));
    assert!(tracker.comments().is_empty());
}

#[tokio::test]
async fn pending_confirmation_claims_a_forget_turn() {
    let report = r#"{"assessment": "Missing auth notes.",
        "api_related": true,
        "suggested_comment": "Add 401 handling."}"#;
    let llm = ScriptedLlm::new(&["VALIDATE", report]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "POST /login", "");

    let mut config = base_config();
    config.router.write_comments = true;
    let mut router = router(config, llm.clone(), tracker.clone());

    router.ask("validate PROJ-1").await.unwrap();

    // The gate consumes the turn as a decline; nothing else sees it
    let calls_before = llm.calls();
    let reply = router.ask("forget it").await.unwrap();
    assert_eq!(llm.calls(), calls_before);
    assert!(reply.contains("won't post"));
    assert!(tracker.comments().is_empty());

    // The parked write is gone, so a stray yes later posts nothing
    llm.queue(&["INSIGHT", "INSIGHT"]);
    let reply = router.ask("yes").await.unwrap();
    assert!(tracker.comments().is_empty());
    assert!(reply.contains("Which issue"));
}

#[tokio::test]
async fn comments_stay_suggestions_when_writes_are_off() {
    let report = r#"{"assessment": "Looks incomplete.",
        "api_related": true,
        "suggested_comment": "Add a response schema."}"#;
    let llm = ScriptedLlm::new(&["VALIDATE", report]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "PUT /users", "");
    let mut router = router(base_config(), llm, tracker.clone());

    let reply = router.ask("validate PROJ-1").await.unwrap();

    assert!(reply.contains("Suggested comment:"));
    assert!(!reply.contains("Shall I post"));
    assert!(tracker.comments().is_empty());
}

#[tokio::test]
async fn low_confidence_downgrades_to_a_read_only_answer() {
    let llm = ScriptedLlm::new(&["INSIGHT", "NO_HISTORY", "A login issue."]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "Add login", "");
    let mut router = router(base_config(), llm.clone(), tracker.clone());

    router.ask("what is PROJ-1 actually about, in short?").await.unwrap();

    // Both classifications unreadable: confidence 0.5, below the 0.6 default
    llm.queue(&["???", "???", "NO_HISTORY", "I can only describe it."]);
    let reply = router.ask("close it").await.unwrap();

    assert_eq!(reply, "I can only describe it.");
    assert!(tracker.transitioned.lock().unwrap().is_empty());
}

#[tokio::test]
async fn transcript_resets_with_a_notice() {
    let llm = ScriptedLlm::new(&["INSIGHT", "NO_HISTORY", "First answer."]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "Add login", "");

    let mut config = base_config();
    config.router.max_history = 2;
    let mut router = router(config, llm.clone(), tracker);

    let first = router.ask("what is PROJ-1 actually about, in short?").await.unwrap();
    assert!(!first.contains("starting a new conversation"));

    llm.queue(&["INSIGHT", "INSIGHT", "NO_HISTORY", "Second answer."]);
    let second = router.ask("and the status?").await.unwrap();
    assert!(!second.contains("starting a new conversation"));

    // Four transcript lines now; the 2x window is reached
    llm.queue(&["INSIGHT", "INSIGHT", "NO_HISTORY", "Third answer."]);
    let third = router.ask("anything else?").await.unwrap();
    assert!(third.contains("starting a new conversation"));
    assert!(third.contains("Third answer."));

    // The transcript was reset, so the notice does not repeat
    llm.queue(&["INSIGHT", "INSIGHT", "NO_HISTORY", "Fourth answer."]);
    let fourth = router.ask("and after that?").await.unwrap();
    assert!(!fourth.contains("starting a new conversation"));
}

#[tokio::test]
async fn missing_issue_maps_to_a_user_message() {
    let llm = ScriptedLlm::new(&["INSIGHT"]);
    let tracker = Arc::new(MemoryTracker::default());
    let mut router = router(base_config(), llm, tracker);

    let reply = router.ask("what is PROJ-9 actually about, in short?").await.unwrap();
    assert_eq!(reply, "I couldn't find PROJ-9 in the tracker.");
}

#[tokio::test]
async fn question_without_issue_asks_for_one() {
    let llm = ScriptedLlm::new(&["INSIGHT"]);
    let tracker = Arc::new(MemoryTracker::default());
    let mut router = router(base_config(), llm, tracker);

    let reply = router.ask("what should I be working on this week?").await.unwrap();
    assert!(reply.contains("Which issue"));
}

#[tokio::test]
async fn forget_drops_issue_and_transcript() {
    let llm = ScriptedLlm::new(&["INSIGHT", "NO_HISTORY", "An answer."]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "Add login", "");
    let mut router = router(base_config(), llm.clone(), tracker);

    router.ask("what is PROJ-1 actually about, in short?").await.unwrap();
    router.ask("forget everything").await.unwrap();

    // The issue is no longer remembered
    llm.queue(&["INSIGHT"]);
    let reply = router.ask("so what is it actually about then?").await.unwrap();
    assert!(reply.contains("Which issue"));
    assert!(router.history().is_empty() || router.history().len() == 2);
}

#[tokio::test]
async fn forget_mention_mid_question_drops_the_remembered_issue() {
    let llm = ScriptedLlm::new(&["INSIGHT", "NO_HISTORY", "A login issue."]);
    let tracker = MemoryTracker::with_issue("PROJ-1", "Add login", "");
    let mut router = router(base_config(), llm.clone(), tracker);

    router.ask("what is PROJ-1 actually about, in short?").await.unwrap();

    // Not a bare command, so the turn is answered and recorded as usual,
    // but the remembered issue is dropped afterwards
    llm.queue(&["INSIGHT", "INSIGHT", "NO_HISTORY", "Alright, noted."]);
    let reply = router.ask("please forget that issue now").await.unwrap();
    assert_eq!(reply, "Alright, noted.");
    assert!(!router.history().is_empty());

    llm.queue(&["INSIGHT", "INSIGHT"]);
    let reply = router.ask("so what is it about?").await.unwrap();
    assert!(reply.contains("Which issue"));
}

#[tokio::test]
async fn creation_targets_the_named_project() {
    let draft = r#"{"summary": "Add rate limiting", "description": "Throttle login attempts", "issue_type": "Task"}"#;
    let llm = ScriptedLlm::new(&["CREATE", draft]);
    let tracker = Arc::new(MemoryTracker::default());

    let mut config = base_config();
    config.router.projects = vec!["PROJ".to_string(), "OPS".to_string()];
    let mut router = router(config, llm, tracker.clone());

    let reply = router
        .ask("create a ticket in OPS for rate limiting on the login endpoint")
        .await
        .unwrap();

    assert!(reply.contains("OPS-100"));
    assert_eq!(
        tracker.created.lock().unwrap().clone(),
        vec![("OPS".to_string(), "Add rate limiting".to_string())]
    );
}

#[tokio::test]
async fn configuration_defect_fails_construction() {
    // An unreadable override shadows the intent prompt
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("intent.hbs")).unwrap();

    let mut config = base_config();
    config.router.prompt_dir = Some(dir.path().to_path_buf());

    let llm = ScriptedLlm::new(&[]);
    let tracker = Arc::new(MemoryTracker::default());
    let result = Router::new(&config, llm, tracker);

    assert!(matches!(result, Err(issuepilot::AgentError::Configuration(_))));
}
