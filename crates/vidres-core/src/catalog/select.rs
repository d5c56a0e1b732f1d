//! Quality-to-candidate selection with downgrade fallback.

use crate::config::CatalogConfig;
use crate::error::ResolveError;

use super::candidate::{CandidateSet, ContainerType, PlaybackCandidate};
use super::tier::QualityTier;

/// Outcome of selecting a candidate for a tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Stream to render (with or without embedded audio).
    pub video: PlaybackCandidate,
    /// Separate audio source when `video` has no embedded audio.
    pub audio: Option<PlaybackCandidate>,
    /// Tier the caller asked for.
    pub requested: QualityTier,
    /// Tier actually selected (LOW after a downgrade).
    pub tier: QualityTier,
    /// True when the requested tier was unavailable and LOW was used instead.
    pub downgraded: bool,
}

impl Selection {
    /// Playback needs a second (audio) stream; the video output should be muted.
    pub fn needs_secondary_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn requires_decryption(&self) -> bool {
        self.video.requires_decryption()
            || self
                .audio
                .as_ref()
                .is_some_and(PlaybackCandidate::requires_decryption)
    }
}

/// Selects candidates by tier.
///
/// The 2160p alternate format codes cover 4K streams that are listed without
/// a standard resolution tag; they come from config so they can follow
/// upstream format changes.
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    uhd_alternate_codes: Vec<u32>,
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default())
    }
}

impl FormatCatalog {
    pub fn from_config(cfg: &CatalogConfig) -> Self {
        Self {
            uhd_alternate_codes: cfg.uhd_alternate_format_codes.clone(),
        }
    }

    /// Picks the candidate for `tier`:
    /// 1. MP4 with exactly the tier's resolution;
    /// 2. for 2160p only, a candidate with one of the alternate format codes;
    /// 3. the LOW (360p MP4) candidate, flagged as downgraded;
    /// 4. otherwise `NoCandidateAvailable`.
    pub fn select(&self, set: &CandidateSet, tier: QualityTier) -> Result<Selection, ResolveError> {
        if set.is_empty() {
            return Err(ResolveError::NoCandidateAvailable);
        }

        let (video, effective) = if let Some(c) = exact_match(set, tier.resolution()) {
            (c, tier)
        } else if let Some(c) = tier
            .is_max()
            .then(|| self.alternate_match(set))
            .flatten()
        {
            tracing::debug!(
                format_code = c.format_code(),
                "2160p served by alternate format code"
            );
            (c, tier)
        } else if let Some(c) = exact_match(set, QualityTier::Low.resolution()) {
            (c, QualityTier::Low)
        } else {
            return Err(ResolveError::NoCandidateAvailable);
        };

        let downgraded = effective != tier;
        if downgraded {
            tracing::info!(requested = %tier, "requested tier unavailable, using low");
        }

        let audio = if effective != QualityTier::Low && !video.has_embedded_audio() {
            audio_source(set).cloned()
        } else {
            None
        };

        Ok(Selection {
            video: video.clone(),
            audio,
            requested: tier,
            tier: effective,
            downgraded,
        })
    }

    fn alternate_match<'a>(&self, set: &'a CandidateSet) -> Option<&'a PlaybackCandidate> {
        self.uhd_alternate_codes
            .iter()
            .find_map(|code| set.iter().find(|c| c.format_code() == *code))
    }
}

/// MP4 candidate with the given resolution; prefers one with embedded audio.
fn exact_match(set: &CandidateSet, resolution: u32) -> Option<&PlaybackCandidate> {
    let mut matches = set
        .iter()
        .filter(|c| c.container() == ContainerType::Mp4 && c.resolution() == resolution);
    let first = matches.next()?;
    if first.has_embedded_audio() {
        return Some(first);
    }
    matches.find(|c| c.has_embedded_audio()).or(Some(first))
}

/// Audio-only candidate, else the 360p MP4 that carries audio.
fn audio_source(set: &CandidateSet) -> Option<&PlaybackCandidate> {
    set.iter().find(|c| c.is_audio_only()).or_else(|| {
        set.iter().find(|c| {
            c.container() == ContainerType::Mp4
                && c.resolution() == QualityTier::Low.resolution()
                && c.has_embedded_audio()
        })
    })
}
