use crate::error::ErrorKind;

/// Decision returned by the escalation policy for a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-run candidate fetch through the direct resolver.
    RetryDirect,
    /// Switch the session to the fallback service (once per session).
    EscalateToFallback,
    /// Report the failure; no further automatic action.
    Terminate,
}

/// Fixed retry budget: `retry_threshold` failed direct attempts, then one
/// escalation to the fallback service, then terminal.
#[derive(Debug, Clone, Copy)]
pub struct EscalationPolicy {
    /// Attempts counted before escalation (default 1).
    pub retry_threshold: u32,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self { retry_threshold: 1 }
    }
}

impl EscalationPolicy {
    pub fn new(retry_threshold: u32) -> Self {
        Self { retry_threshold }
    }

    /// Decide what follows a failure.
    ///
    /// `attempt_count` is the session counter *after* it was incremented for
    /// this failure. `using_fallback` is true once the session has escalated.
    pub fn decide(&self, attempt_count: u32, using_fallback: bool, kind: ErrorKind) -> RetryDecision {
        if !kind.is_recoverable() || using_fallback {
            return RetryDecision::Terminate;
        }
        if attempt_count < self.retry_threshold {
            RetryDecision::RetryDirect
        } else {
            RetryDecision::EscalateToFallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_escalates_on_first_failure() {
        let p = EscalationPolicy::default();
        assert_eq!(
            p.decide(1, false, ErrorKind::NoCandidateAvailable),
            RetryDecision::EscalateToFallback
        );
    }

    #[test]
    fn retries_directly_below_threshold() {
        let p = EscalationPolicy::new(3);
        assert_eq!(
            p.decide(1, false, ErrorKind::FetchTimedOut),
            RetryDecision::RetryDirect
        );
        assert_eq!(
            p.decide(2, false, ErrorKind::ScriptFetchFailed),
            RetryDecision::RetryDirect
        );
        assert_eq!(
            p.decide(3, false, ErrorKind::ScriptFetchFailed),
            RetryDecision::EscalateToFallback
        );
    }

    #[test]
    fn terminal_after_fallback() {
        let p = EscalationPolicy::new(3);
        assert_eq!(
            p.decide(1, true, ErrorKind::ServiceUnreachable),
            RetryDecision::Terminate
        );
        assert_eq!(
            p.decide(1, true, ErrorKind::PlaybackFailed),
            RetryDecision::Terminate
        );
    }

    #[test]
    fn unrecoverable_kinds_never_retry() {
        let p = EscalationPolicy::new(5);
        assert_eq!(
            p.decide(1, false, ErrorKind::InvalidUrlKind),
            RetryDecision::Terminate
        );
        assert_eq!(
            p.decide(1, false, ErrorKind::DecryptionUnsupported),
            RetryDecision::Terminate
        );
    }
}
