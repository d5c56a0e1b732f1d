use super::event::PlaybackReporter;

/// External playback engine.
///
/// `play` is called once for the video stream and, for dual-stream
/// playback, once more with `is_audio_track = true`. The engine reports
/// `started`, `error` and `finished` through the reporter.
pub trait PlaybackSink: Send + Sync {
    fn play(&self, url: &str, is_audio_track: bool, reporter: PlaybackReporter);
    fn stop(&self);
}

/// Sink for load-only use; never receives a `play` call there.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlayback;

impl PlaybackSink for NoPlayback {
    fn play(&self, url: &str, is_audio_track: bool, _reporter: PlaybackReporter) {
        tracing::debug!(url, is_audio_track, "no playback engine attached");
    }

    fn stop(&self) {}
}
