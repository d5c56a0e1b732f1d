use std::fmt;
use std::time::Instant;

use crate::catalog::{QualityTier, Selection};
use crate::error::ResolveError;
use crate::url_model::VideoId;

/// Identifies one play request; events carrying another token are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(pub(crate) u64);

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Normalizing,
    FetchingCandidates,
    SelectingFormat,
    Decrypting,
    Ready,
    Playing,
    Retrying,
    Terminated,
}

impl State {
    /// Between a play request and a usable (or failed) result.
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            State::Normalizing
                | State::FetchingCandidates
                | State::SelectingFormat
                | State::Decrypting
                | State::Retrying
        )
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::Idle => "idle",
            State::Normalizing => "normalizing",
            State::FetchingCandidates => "fetching-candidates",
            State::SelectingFormat => "selecting-format",
            State::Decrypting => "decrypting",
            State::Ready => "ready",
            State::Playing => "playing",
            State::Retrying => "retrying",
            State::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// Mutable state of the active play request.
#[derive(Debug, Clone)]
pub struct ResolutionSession {
    pub token: SessionToken,
    pub identifier: VideoId,
    pub start_offset: Option<u32>,
    pub requested_tier: QualityTier,
    /// Tier used for the next selection; forced to LOW by timeouts and playback errors.
    pub tier: QualityTier,
    pub attempt_count: u32,
    pub using_fallback: bool,
    pub last_error_at: Option<Instant>,
    pub started_at: Option<Instant>,
    pub last_error: Option<ResolveError>,
    /// Set from a failure until the next resolution reaches Ready.
    pub retry_in_flight: bool,
    pub(crate) pending: Option<Selection>,
}

impl ResolutionSession {
    pub(crate) fn new(
        token: SessionToken,
        identifier: VideoId,
        start_offset: Option<u32>,
        requested_tier: QualityTier,
        using_fallback: bool,
    ) -> Self {
        Self {
            token,
            identifier,
            start_offset,
            requested_tier,
            tier: requested_tier,
            attempt_count: 0,
            using_fallback,
            last_error_at: None,
            started_at: None,
            last_error: None,
            retry_in_flight: false,
            pending: None,
        }
    }
}
