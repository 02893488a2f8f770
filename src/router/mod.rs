//! Question routing and plan execution

mod confirm;
mod core;
mod extract;
mod intent;
mod plan;
mod registry;
mod session;

pub use confirm::{ConfirmationGate, PendingConfirmation};
pub use core::Router;
pub use extract::IssueReferenceExtractor;
pub use intent::{Intent, IntentClassifier};
pub use plan::{Plan, PlanExecutor, Step, StepOutcome, StepResults};
pub use registry::{Capability, CapabilityRegistry};
pub use session::SessionContext;
