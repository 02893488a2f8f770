//! Single-slot confirmation gate
//!
//! At most one action waits for a yes/no at a time. Requesting a new
//! confirmation while one is pending replaces it; the next user turn is
//! consumed as the reply either way.

use tracing::warn;

/// An action parked until the user confirms it
#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    /// Issue the action targets
    pub issue_key: String,

    /// Comment text to post on confirmation
    pub payload: String,

    /// Question shown to the user
    pub prompt: String,
}

/// Holds the pending confirmation, if any
#[derive(Debug, Default)]
pub struct ConfirmationGate {
    pending: Option<PendingConfirmation>,
}

impl ConfirmationGate {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Park an action; any previous pending action is dropped
    pub fn request(&mut self, confirmation: PendingConfirmation) {
        if let Some(previous) = &self.pending {
            warn!(issue = %previous.issue_key, "Replacing pending confirmation");
        }
        self.pending = Some(confirmation);
    }

    /// Consume the user's reply
    ///
    /// Returns the parked action when the reply is affirmative. The slot
    /// is emptied either way.
    pub fn resolve(&mut self, reply: &str) -> Option<PendingConfirmation> {
        let pending = self.pending.take()?;
        if is_affirmative(reply) { Some(pending) } else { None }
    }
}

fn is_affirmative(reply: &str) -> bool {
    reply.trim().to_lowercase().starts_with('y')
}
