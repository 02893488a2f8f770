//! Tracked-item store client
//!
//! The `TrackerClient` trait is the only surface the rest of the crate
//! depends on; `JiraClient` is the one concrete implementation.

mod client;
mod error;
mod types;

pub use client::{JiraClient, TrackerClient};
pub use error::TrackerError;
pub use types::{FieldMeta, Transition, TransitionTarget, extract_plain_text, issue_text};
