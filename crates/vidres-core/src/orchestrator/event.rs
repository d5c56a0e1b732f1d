use tokio::sync::mpsc::UnboundedSender;

use crate::catalog::{CandidateSet, QualityTier};
use crate::error::ResolveError;
use crate::url_model::VideoId;

use super::session::SessionToken;

/// Completion of one asynchronous stage, tagged with its session.
#[derive(Debug)]
pub struct Event {
    pub token: SessionToken,
    pub kind: EventKind,
}

#[derive(Debug)]
pub enum EventKind {
    Candidates(Result<CandidateSet, ResolveError>),
    /// Playable video URL and optional audio URL.
    Decrypted(Result<(String, Option<String>), ResolveError>),
    Playback(PlaybackEvent),
}

/// Signals from the playback collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started,
    ErrorOccurred(String),
    Finished,
}

/// Handle given to the playback collaborator to report back.
#[derive(Debug, Clone)]
pub struct PlaybackReporter {
    token: SessionToken,
    tx: UnboundedSender<Event>,
}

impl PlaybackReporter {
    pub(crate) fn new(token: SessionToken, tx: UnboundedSender<Event>) -> Self {
        Self { token, tx }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn started(&self) {
        self.send(PlaybackEvent::Started);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(PlaybackEvent::ErrorOccurred(message.into()));
    }

    pub fn finished(&self) {
        self.send(PlaybackEvent::Finished);
    }

    fn send(&self, event: PlaybackEvent) {
        // Receiver gone means the orchestrator was dropped.
        let _ = self.tx.send(Event {
            token: self.token,
            kind: EventKind::Playback(event),
        });
    }
}

/// Playable result of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub id: VideoId,
    pub video_url: String,
    /// Separate audio stream; the video output should be muted when set.
    pub audio_url: Option<String>,
    pub requested: QualityTier,
    pub tier: QualityTier,
    pub downgraded: bool,
    pub start_offset: Option<u32>,
    pub via_fallback: bool,
}

/// What `Orchestrator::next_outcome` reports to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Resolved(Resolution),
    Failed(ResolveError),
    Finished,
}
