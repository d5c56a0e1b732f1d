//! Retry and fallback-escalation policy.
//!
//! Encapsulates the per-session retry budget (a number of direct
//! re-resolutions followed by a single permanent escalation to the fallback
//! service) so the orchestrator's state machine only asks "what next?".

mod policy;

pub use policy::{EscalationPolicy, RetryDecision};
