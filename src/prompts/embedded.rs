//! Embedded fallback prompts
//!
//! These are compiled into the binary and used when no override file is
//! found in the configured prompt directory.

/// Intent classification
pub const INTENT: &str = r#"You are the request classifier for a Jira assistant.
Label the user's request with exactly one of these intents:

- VALIDATE: the user wants an API contract or endpoint definition checked
- OPERATE: the user wants the issue changed (comment, status, fields) or a multi-step workflow
- INSIGHT: the user wants information, a summary, or an explanation
- TEST: the user wants test cases generated
- CREATE: the user wants a brand new issue created
- UNKNOWN: none of the above fits

Respond with the label only, nothing else.
{{#if history}}
Recent conversation (the request may be a follow-up):
{{history}}
{{/if}}
Request: {{question}}
"#;

/// Decide whether the changelog is needed to answer a question
pub const NEEDS_HISTORY: &str = r#"Does answering the question below require the issue's change history?
Respond with HISTORY or NO_HISTORY, nothing else.

Question: {{question}}
"#;

/// General issue Q&A
pub const INSIGHT: &str = r#"You are a Jira assistant. Answer the user's question using the issue
details{{#if history}} and change history{{/if}} below. Be concise and concrete.

Issue JSON:
{{issue}}
{{#if history}}
History JSON:
{{history}}
{{/if}}
Question: {{question}}
"#;

/// Short issue summary
pub const ISSUE_SUMMARY: &str = r#"Provide a short, one or two sentence summary of the following Jira issue.

Summary: {{summary}}
Description: {{description}}
"#;

/// API contract validation
pub const VALIDATE: &str = r#"You are reviewing the Jira issue below for an API contract. Check whether
the described endpoint definition is complete and consistent: method, path,
request and response shapes, error codes, and auth requirements.

Issue {{key}}: {{summary}}

{{description}}

Respond with a single JSON object and no other text:
{"assessment": "<your findings as prose>",
 "api_related": <true|false>,
 "suggested_comment": "<a comment worth posting to the issue, or null>"}

If the issue is not API related, set api_related to false and explain in
the assessment. Only suggest a comment when it adds concrete, actionable
feedback.
"#;

/// Multi-step operations plan
pub const OPERATIONS_PLAN: &str = r#"Break the user's request into a plan of steps for a Jira issue.

Available agents and actions:
- ops: add_comment(comment), transition_issue(transition), update_fields(fields), fill_field_by_label(field_label, value), create_issue(project_key, summary, description, issue_type)
- insight: answer(question), summarize()
- validator: validate()
- testgen: create_test_cases(question)

A parameter value may reference an earlier step's output as "$stepN" or
"$stepN.field.subfield" (steps are numbered from 1).

Respond with a single JSON object and no other text:
{"issue_key": "<key or null>",
 "plan": [{"agent": "<name>", "action": "<name>", "parameters": {...}}]}

If the request cannot be mapped to these actions, respond with {"plan": []}.

Issue key: {{issue_key}}
Request: {{request}}
"#;

/// Single direct operation (fallback when no plan is produced)
pub const SINGLE_OPERATION: &str = r#"Map the user's request to exactly one Jira operation.

Respond with a single JSON object and no other text, using one of:
{"action": "add_comment", "issue_key": "<key or null>", "comment": "..."}
{"action": "transition_issue", "issue_key": "<key or null>", "transition": "..."}
{"action": "update_fields", "issue_key": "<key or null>", "fields": {...}}
{"action": "fill_field_by_label", "issue_key": "<key or null>", "field_label": "...", "value": "..."}
{"action": "create_issue", "project_key": "...", "summary": "...", "description": "...", "issue_type": "Task"}

Issue key: {{issue_key}}
Request: {{question}}
"#;

/// Pick the closest matching workflow transition
pub const TRANSITION_CHOICE: &str = r#"The user asked to move an issue to "{{requested}}" but that status is not
available. The available transitions are: {{options}}

If one of the available transitions clearly matches what the user meant,
respond with its exact name. Otherwise respond with NONE. Respond with the
name or NONE only.
"#;

/// Generic test-case generation
pub const TEST_CASES: &str = r#"Generate test cases for the API behavior described below. Cover the happy
path, validation failures, and error responses. Number each case and state
the input, the expected status code, and the expected body.

If the text below already contains test cases, respond with HAS_TESTS and
nothing else.

{{summary}}
"#;

/// GET-specific test cases
pub const TEST_CASES_GET: &str = r#"Generate test cases for the GET endpoint described below. Cover: a
successful fetch, missing resource (404), invalid query parameters, and
unauthorized access. Number each case and state the request, the expected
status code, and the expected body.

If the text below already contains test cases, respond with HAS_TESTS and
nothing else.

{{summary}}
"#;

/// POST-specific test cases
pub const TEST_CASES_POST: &str = r#"Generate test cases for the POST endpoint described below. Cover: a
successful creation, missing required fields, invalid field values,
duplicate submission, and unauthorized access. Number each case and state
the request body, the expected status code, and the expected response.

If the text below already contains test cases, respond with HAS_TESTS and
nothing else.

{{summary}}
"#;

/// PUT-specific test cases
pub const TEST_CASES_PUT: &str = r#"Generate test cases for the PUT endpoint described below. Cover: a
successful update, updating a missing resource (404), partial payloads,
no-op updates, and unauthorized access. Number each case and state the
request, the expected status code, and the expected response.

If the text below already contains test cases, respond with HAS_TESTS and
nothing else.

{{summary}}
"#;

/// DELETE-specific test cases
pub const TEST_CASES_DELETE: &str = r#"Generate test cases for the DELETE endpoint described below. Cover: a
successful delete, deleting a missing resource (404), repeated deletes,
and unauthorized access. Number each case and state the request, the
expected status code, and the expected response.

If the text below already contains test cases, respond with HAS_TESTS and
nothing else.

{{summary}}
"#;

/// Draft a new issue from a free-text request
pub const CREATE_ISSUE: &str = r#"Draft a Jira issue for project {{project}} from the request below.

Respond with a single JSON object and no other text:
{"summary": "<one line>",
 "description": "<a few sentences of detail>",
 "issue_type": "<Task, Bug, or Story>"}

Request: {{request}}
"#;

/// Look up an embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    match name {
        "intent" => Some(INTENT),
        "needs-history" => Some(NEEDS_HISTORY),
        "insight" => Some(INSIGHT),
        "issue-summary" => Some(ISSUE_SUMMARY),
        "validate" => Some(VALIDATE),
        "operations-plan" => Some(OPERATIONS_PLAN),
        "single-operation" => Some(SINGLE_OPERATION),
        "transition-choice" => Some(TRANSITION_CHOICE),
        "test-cases" => Some(TEST_CASES),
        "test-cases-get" => Some(TEST_CASES_GET),
        "test-cases-post" => Some(TEST_CASES_POST),
        "test-cases-put" => Some(TEST_CASES_PUT),
        "test-cases-delete" => Some(TEST_CASES_DELETE),
        "create-issue" => Some(CREATE_ISSUE),
        _ => None,
    }
}
