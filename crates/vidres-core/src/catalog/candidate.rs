/// Container of a download candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerType {
    Mp4,
    Other,
}

/// One concrete downloadable stream. Immutable once constructed.
///
/// A candidate requires decryption exactly when it carries a player version
/// tag; the constructors make any other combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackCandidate {
    format_code: u32,
    container: ContainerType,
    resolution: u32,
    has_embedded_audio: bool,
    download_url: String,
    player_version: Option<String>,
}

impl PlaybackCandidate {
    /// Candidate whose URL is directly playable.
    pub fn new(
        format_code: u32,
        container: ContainerType,
        resolution: u32,
        has_embedded_audio: bool,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            format_code,
            container,
            resolution,
            has_embedded_audio,
            download_url: download_url.into(),
            player_version: None,
        }
    }

    /// Candidate whose signature must be descrambled with the given player version.
    pub fn encrypted(
        format_code: u32,
        container: ContainerType,
        resolution: u32,
        has_embedded_audio: bool,
        download_url: impl Into<String>,
        player_version: impl Into<String>,
    ) -> Self {
        Self {
            player_version: Some(player_version.into()),
            ..Self::new(format_code, container, resolution, has_embedded_audio, download_url)
        }
    }

    /// Audio-only stream (resolution 0).
    pub fn audio_only(format_code: u32, container: ContainerType, download_url: impl Into<String>) -> Self {
        Self::new(format_code, container, 0, true, download_url)
    }

    pub fn format_code(&self) -> u32 {
        self.format_code
    }

    pub fn container(&self) -> ContainerType {
        self.container
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn has_embedded_audio(&self) -> bool {
        self.has_embedded_audio
    }

    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    pub fn player_version(&self) -> Option<&str> {
        self.player_version.as_deref()
    }

    pub fn requires_decryption(&self) -> bool {
        self.player_version.is_some()
    }

    pub fn is_audio_only(&self) -> bool {
        self.resolution == 0 && self.has_embedded_audio
    }
}

/// Ordered candidates produced by one resolution attempt. Never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    candidates: Vec<PlaybackCandidate>,
}

impl CandidateSet {
    pub fn new(candidates: Vec<PlaybackCandidate>) -> Self {
        Self { candidates }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlaybackCandidate> {
        self.candidates.iter()
    }
}

impl FromIterator<PlaybackCandidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = PlaybackCandidate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a PlaybackCandidate;
    type IntoIter = std::slice::Iter<'a, PlaybackCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decryption_flag_follows_player_version() {
        let plain = PlaybackCandidate::new(18, ContainerType::Mp4, 360, true, "https://a/b");
        assert!(!plain.requires_decryption());
        assert!(plain.player_version().is_none());

        let enc = PlaybackCandidate::encrypted(22, ContainerType::Mp4, 720, true, "https://a/c", "-vfl3ab");
        assert!(enc.requires_decryption());
        assert_eq!(enc.player_version(), Some("-vfl3ab"));
        assert_eq!(enc.resolution(), 720);
    }

    #[test]
    fn audio_only_has_no_resolution() {
        let a = PlaybackCandidate::audio_only(140, ContainerType::Mp4, "https://a/audio");
        assert!(a.is_audio_only());
        assert!(a.has_embedded_audio());
        assert_eq!(a.resolution(), 0);
    }
}
