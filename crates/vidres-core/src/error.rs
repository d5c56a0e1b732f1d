//! Error taxonomy for the resolution pipeline.
//!
//! Every stage (normalization, candidate fetch, selection, decryption,
//! playback) reports a `ResolveError`. The orchestrator only looks at its
//! `ErrorKind` to decide between retry, fallback escalation and termination.

use thiserror::Error;

/// Error raised by any stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Input could not be turned into a video identifier.
    #[error("not a recognizable video URL: {0}")]
    InvalidUrlKind(String),

    /// Candidate set was empty or had no usable format for the tier.
    #[error("no playable candidate available")]
    NoCandidateAvailable,

    /// `decrypt` was called on a candidate that is not signature-obfuscated.
    #[error("candidate does not require decryption")]
    DecryptionUnsupported,

    /// Player script for the version tag could not be retrieved.
    #[error("player script fetch failed: {0}")]
    ScriptFetchFailed(String),

    /// No descrambling routine could be located in the player script.
    #[error("descrambling routine not found: {0}")]
    TransformExtractionFailed(String),

    /// Fallback service could not be reached (transport error or non-2xx).
    #[error("fallback service unreachable: {0}")]
    ServiceUnreachable(String),

    /// Fallback service answered with a body we could not use.
    #[error("fallback service response malformed: {0}")]
    ServiceResponseMalformed(String),

    /// Candidate fetch exceeded its wall-clock bound.
    #[error("candidate fetch timed out after {0:?}")]
    FetchTimedOut(std::time::Duration),

    /// External resolver reported a failure of its own.
    #[error("resolver failed: {0}")]
    ResolverFailed(String),

    /// Playback collaborator reported an error after playback started.
    #[error("playback failed: {0}")]
    PlaybackFailed(String),
}

/// Coarse classification used by the retry/escalation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUrlKind,
    NoCandidateAvailable,
    DecryptionUnsupported,
    ScriptFetchFailed,
    TransformExtractionFailed,
    ServiceUnreachable,
    ServiceResponseMalformed,
    FetchTimedOut,
    ResolverFailed,
    PlaybackFailed,
}

impl ErrorKind {
    /// Recoverable kinds go through the retry/escalation path; the rest are
    /// reported immediately.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, Self::InvalidUrlKind | Self::DecryptionUnsupported)
    }

    /// Kinds that force the session down to the LOW tier before retrying.
    pub fn forces_low_tier(self) -> bool {
        matches!(self, Self::FetchTimedOut | Self::PlaybackFailed)
    }
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrlKind(_) => ErrorKind::InvalidUrlKind,
            Self::NoCandidateAvailable => ErrorKind::NoCandidateAvailable,
            Self::DecryptionUnsupported => ErrorKind::DecryptionUnsupported,
            Self::ScriptFetchFailed(_) => ErrorKind::ScriptFetchFailed,
            Self::TransformExtractionFailed(_) => ErrorKind::TransformExtractionFailed,
            Self::ServiceUnreachable(_) => ErrorKind::ServiceUnreachable,
            Self::ServiceResponseMalformed(_) => ErrorKind::ServiceResponseMalformed,
            Self::FetchTimedOut(_) => ErrorKind::FetchTimedOut,
            Self::ResolverFailed(_) => ErrorKind::ResolverFailed,
            Self::PlaybackFailed(_) => ErrorKind::PlaybackFailed,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind().is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn invalid_url_is_not_recoverable() {
        let e = ResolveError::InvalidUrlKind("https://example.com/notavideo".into());
        assert_eq!(e.kind(), ErrorKind::InvalidUrlKind);
        assert!(!e.is_recoverable());
        assert!(!ResolveError::DecryptionUnsupported.is_recoverable());
    }

    #[test]
    fn fetch_and_decrypt_failures_are_recoverable() {
        assert!(ResolveError::NoCandidateAvailable.is_recoverable());
        assert!(ResolveError::ScriptFetchFailed("HTTP 404".into()).is_recoverable());
        assert!(ResolveError::TransformExtractionFailed("x".into()).is_recoverable());
        assert!(ResolveError::ServiceUnreachable("x".into()).is_recoverable());
        assert!(ResolveError::FetchTimedOut(Duration::from_secs(5)).is_recoverable());
    }

    #[test]
    fn timeout_and_playback_force_low_tier() {
        assert!(ErrorKind::FetchTimedOut.forces_low_tier());
        assert!(ErrorKind::PlaybackFailed.forces_low_tier());
        assert!(!ErrorKind::NoCandidateAvailable.forces_low_tier());
    }

    #[test]
    fn display_includes_detail() {
        let e = ResolveError::ScriptFetchFailed("HTTP 404".into());
        assert_eq!(e.to_string(), "player script fetch failed: HTTP 404");
    }
}
