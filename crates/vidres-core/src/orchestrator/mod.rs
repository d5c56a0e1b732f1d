//! Resolution state machine for one play request at a time.
//!
//! Each asynchronous stage (candidate fetch, decryption) runs as a spawned
//! task that sends exactly one `Event` back over the orchestrator's channel.
//! Events are applied in `handle`, on the caller's task, and dropped when
//! their session token no longer matches the active session. Playback
//! engine signals arrive through the same channel via `PlaybackReporter`.

mod event;
mod session;
mod sink;


pub use event::{Event, EventKind, Outcome, PlaybackEvent, PlaybackReporter, Resolution};
pub use session::{ResolutionSession, SessionToken, State};
pub use sink::{NoPlayback, PlaybackSink};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::{CandidateSet, FormatCatalog, QualityTier, Selection};
use crate::config::VidresConfig;
use crate::decrypt::SignatureDecryptor;
use crate::error::ResolveError;
use crate::resolver::{CandidateResolver, CandidateSource};
use crate::retry::{EscalationPolicy, RetryDecision};
use crate::url_model;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Bounded wait for one direct candidate fetch.
    pub fetch_timeout: Duration,
    pub retry_threshold: u32,
    /// Start every session on the fallback source.
    pub force_fallback: bool,
    /// Stop at Ready and report URLs without calling the playback engine.
    pub load_urls_only: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            retry_threshold: 1,
            force_fallback: false,
            load_urls_only: false,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_config(cfg: &VidresConfig) -> Self {
        Self {
            fetch_timeout: cfg.fetch_timeout(),
            retry_threshold: cfg.retry_threshold,
            force_fallback: cfg.force_fallback,
            load_urls_only: false,
        }
    }
}

/// External collaborators driven by the orchestrator.
pub struct Collaborators {
    pub direct: Arc<dyn CandidateResolver>,
    pub fallback: Arc<dyn CandidateSource>,
    pub decryptor: Arc<SignatureDecryptor>,
    pub sink: Arc<dyn PlaybackSink>,
}

pub struct Orchestrator {
    cfg: OrchestratorConfig,
    policy: EscalationPolicy,
    catalog: FormatCatalog,
    collab: Collaborators,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    state: State,
    session: Option<ResolutionSession>,
    stage: Option<JoinHandle<()>>,
    outcomes: VecDeque<Outcome>,
    next_token: u64,
}

impl Orchestrator {
    pub fn new(cfg: OrchestratorConfig, catalog: FormatCatalog, collab: Collaborators) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            policy: EscalationPolicy::new(cfg.retry_threshold),
            cfg,
            catalog,
            collab,
            events_tx,
            events_rx,
            state: State::Idle,
            session: None,
            stage: None,
            outcomes: VecDeque::new(),
            next_token: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn session(&self) -> Option<&ResolutionSession> {
        self.session.as_ref()
    }

    /// Starts a new session, superseding any active one.
    ///
    /// Normalization runs inline; a malformed input terminates the session
    /// and is returned, never retried. Must be called inside a tokio runtime.
    pub fn play(&mut self, raw: &str, tier: QualityTier) -> Result<SessionToken, ResolveError> {
        self.discard_session();
        self.next_token += 1;
        let token = SessionToken(self.next_token);

        self.set_state(State::Normalizing);
        let normalized = match url_model::normalize(raw) {
            Ok(n) => n,
            Err(e) => {
                tracing::info!(%token, input = raw, "play request rejected: {e}");
                self.set_state(State::Terminated);
                return Err(e);
            }
        };

        tracing::info!(%token, video = %normalized.id, %tier, "play request");
        self.session = Some(ResolutionSession::new(
            token,
            normalized.id,
            normalized.start_offset,
            tier,
            self.cfg.force_fallback,
        ));
        self.fetch_candidates();
        Ok(token)
    }

    /// Cancels the active session and stops playback.
    pub fn stop(&mut self) {
        if self.session.is_some() {
            self.collab.sink.stop();
        }
        self.discard_session();
        self.set_state(State::Idle);
    }

    /// Waits for the next outcome of the active session.
    ///
    /// Returns `None` when no session is active and nothing is queued.
    pub async fn next_outcome(&mut self) -> Option<Outcome> {
        loop {
            if let Some(outcome) = self.outcomes.pop_front() {
                return Some(outcome);
            }
            self.session.as_ref()?;
            let event = self.events_rx.recv().await?;
            self.handle(event);
        }
    }

    /// Applies one stage completion or playback signal.
    pub fn handle(&mut self, event: Event) {
        let Some(session) = self.session.as_ref() else {
            tracing::debug!(token = %event.token, "event without active session dropped");
            return;
        };
        if event.token != session.token {
            tracing::debug!(token = %event.token, active = %session.token, "stale event dropped");
            return;
        }

        match event.kind {
            EventKind::Candidates(res) if self.state == State::FetchingCandidates => {
                self.stage = None;
                match res {
                    Ok(set) => self.select(&set),
                    Err(e) => self.fail(e),
                }
            }
            EventKind::Decrypted(res) if self.state == State::Decrypting => {
                self.stage = None;
                match res {
                    Ok((video, audio)) => self.ready(video, audio),
                    Err(e) => self.fail(e),
                }
            }
            EventKind::Playback(ev) => self.on_playback(ev),
            other => {
                tracing::debug!(state = %self.state, event = ?other, "event out of sequence dropped");
            }
        }
    }

    fn set_state(&mut self, state: State) {
        if self.state != state {
            tracing::debug!(from = %self.state, to = %state, "state transition");
            self.state = state;
        }
    }

    fn discard_session(&mut self) {
        if let Some(stage) = self.stage.take() {
            stage.abort();
        }
        self.session = None;
        self.outcomes.clear();
    }

    fn fetch_candidates(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let token = session.token;
        let id = session.identifier.clone();
        let tx = self.events_tx.clone();

        let handle = if session.using_fallback {
            tracing::debug!(%token, video = %id, "fetching candidates from fallback service");
            let source = Arc::clone(&self.collab.fallback);
            tokio::spawn(async move {
                let res = source.fetch_candidates(&id).await;
                let _ = tx.send(Event {
                    token,
                    kind: EventKind::Candidates(res),
                });
            })
        } else {
            tracing::debug!(%token, video = %id, "fetching candidates from resolver");
            let resolver = Arc::clone(&self.collab.direct);
            let timeout = self.cfg.fetch_timeout;
            tokio::spawn(async move {
                let res = match tokio::time::timeout(timeout, resolver.get_download_urls(&id)).await {
                    Ok(res) => res,
                    Err(_) => Err(ResolveError::FetchTimedOut(timeout)),
                };
                let _ = tx.send(Event {
                    token,
                    kind: EventKind::Candidates(res),
                });
            })
        };
        self.stage = Some(handle);
        self.set_state(State::FetchingCandidates);
    }

    fn select(&mut self, set: &CandidateSet) {
        self.set_state(State::SelectingFormat);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let selection = match self.catalog.select(set, session.tier) {
            Ok(s) => s,
            Err(e) => return self.fail(e),
        };

        if !selection.requires_decryption() {
            let video = selection.video.download_url().to_string();
            let audio = selection.audio.as_ref().map(|a| a.download_url().to_string());
            session.pending = Some(selection);
            return self.ready(video, audio);
        }

        let token = session.token;
        session.pending = Some(selection.clone());
        let decryptor = Arc::clone(&self.collab.decryptor);
        let tx = self.events_tx.clone();
        self.stage = Some(tokio::spawn(async move {
            let res = decrypt_selection(&decryptor, &selection).await;
            let _ = tx.send(Event {
                token,
                kind: EventKind::Decrypted(res),
            });
        }));
        self.set_state(State::Decrypting);
    }

    fn ready(&mut self, video_url: String, audio_url: Option<String>) {
        self.set_state(State::Ready);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(selection) = session.pending.take() else {
            return;
        };
        session.retry_in_flight = false;
        session.started_at = None;

        let resolution = Resolution {
            id: session.identifier.clone(),
            video_url,
            audio_url,
            requested: session.requested_tier,
            tier: selection.tier,
            downgraded: selection.downgraded || selection.tier != session.requested_tier,
            start_offset: session.start_offset,
            via_fallback: session.using_fallback,
        };
        tracing::info!(
            token = %session.token,
            video = %resolution.id,
            tier = %resolution.tier,
            downgraded = resolution.downgraded,
            via_fallback = resolution.via_fallback,
            "resolved"
        );

        if self.cfg.load_urls_only {
            self.outcomes.push_back(Outcome::Resolved(resolution));
            self.session = None;
            return;
        }

        let reporter = PlaybackReporter::new(session.token, self.events_tx.clone());
        self.collab.sink.play(&resolution.video_url, false, reporter.clone());
        if let Some(audio) = &resolution.audio_url {
            self.collab.sink.play(audio, true, reporter);
        }
        self.outcomes.push_back(Outcome::Resolved(resolution));
        self.set_state(State::Playing);
    }

    fn on_playback(&mut self, event: PlaybackEvent) {
        if self.state != State::Playing {
            tracing::debug!(state = %self.state, ?event, "playback signal outside playing dropped");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match event {
            PlaybackEvent::Started => {
                session.started_at = Some(Instant::now());
            }
            PlaybackEvent::ErrorOccurred(message) => {
                if session.started_at.is_none() || session.retry_in_flight {
                    tracing::debug!(%message, "playback error before start ignored");
                    return;
                }
                tracing::warn!(token = %session.token, %message, "playback failed");
                self.collab.sink.stop();
                self.fail(ResolveError::PlaybackFailed(message));
            }
            PlaybackEvent::Finished => {
                tracing::info!(token = %session.token, "playback finished");
                self.session = None;
                self.outcomes.push_back(Outcome::Finished);
                self.set_state(State::Terminated);
            }
        }
    }

    /// Routes a stage failure through the escalation policy.
    fn fail(&mut self, err: ResolveError) {
        self.set_state(State::Retrying);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.pending = None;
        session.started_at = None;
        session.last_error_at = Some(Instant::now());
        session.last_error = Some(err.clone());
        session.retry_in_flight = true;
        if err.kind().forces_low_tier() {
            session.tier = QualityTier::Low;
        }
        session.attempt_count += 1;

        match self
            .policy
            .decide(session.attempt_count, session.using_fallback, err.kind())
        {
            RetryDecision::RetryDirect => {
                tracing::warn!(token = %session.token, attempt = session.attempt_count, "retrying direct resolution: {err}");
                self.fetch_candidates();
            }
            RetryDecision::EscalateToFallback => {
                tracing::warn!(token = %session.token, "escalating to fallback service: {err}");
                session.using_fallback = true;
                session.attempt_count = 0;
                self.fetch_candidates();
            }
            RetryDecision::Terminate => {
                tracing::info!(token = %session.token, "session failed: {err}");
                self.session = None;
                self.outcomes.push_back(Outcome::Failed(err));
                self.set_state(State::Terminated);
            }
        }
    }
}

/// Decrypts the video and then the audio stream, as needed.
async fn decrypt_selection(
    decryptor: &SignatureDecryptor,
    selection: &Selection,
) -> Result<(String, Option<String>), ResolveError> {
    let video = if selection.video.requires_decryption() {
        decryptor.decrypt(&selection.video).await?
    } else {
        selection.video.download_url().to_string()
    };
    let audio = match &selection.audio {
        Some(a) if a.requires_decryption() => Some(decryptor.decrypt(a).await?),
        Some(a) => Some(a.download_url().to_string()),
        None => None,
    };
    Ok((video, audio))
}
