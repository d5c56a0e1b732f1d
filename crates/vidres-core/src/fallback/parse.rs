//! Response body of the fallback service and its mapping onto candidates.

use serde::Deserialize;

use crate::catalog::{CandidateSet, ContainerType, PlaybackCandidate};
use crate::error::ResolveError;

/// Format code given to the top-level "best with audio" URL.
pub const BEST_WITH_AUDIO_FORMAT: u32 = 18;

/// Root object: `{ "videos": [ ... ] }`.
#[derive(Debug, Deserialize)]
pub struct ServiceResponse {
    #[serde(default)]
    pub videos: Vec<ServiceVideo>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceVideo {
    /// Best format that includes audio.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub formats: Vec<ServiceFormat>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceFormat {
    pub format_id: String,
    #[serde(default)]
    pub url: String,
}

/// What a known format code stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormatSlot {
    Video(u32),
    AudioOnly,
}

/// Fixed format table. Codes not listed (including sub-360p 133/160) are ignored.
fn slot_for(code: u32) -> Option<FormatSlot> {
    match code {
        134 => Some(FormatSlot::Video(360)),
        136 => Some(FormatSlot::Video(720)),
        137 => Some(FormatSlot::Video(1080)),
        266 => Some(FormatSlot::Video(2160)),
        139 => Some(FormatSlot::AudioOnly),
        _ => None,
    }
}

/// Leading digits of a `format_id` such as `"137"` or `"137 - 1920x1080"`.
fn format_code(format_id: &str) -> Option<u32> {
    let digits: String = format_id
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

impl ServiceResponse {
    pub fn from_json(body: &str) -> Result<Self, ResolveError> {
        serde_json::from_str(body).map_err(|e| ResolveError::ServiceResponseMalformed(e.to_string()))
    }

    /// Builds the candidate set from the first video entry.
    ///
    /// The best-with-audio URL comes first as a 360p MP4 with audio. A known
    /// format whose own URL is empty gets the best-with-audio URL instead.
    pub fn to_candidate_set(&self) -> Result<CandidateSet, ResolveError> {
        let video = self
            .videos
            .first()
            .ok_or_else(|| ResolveError::ServiceResponseMalformed("no videos in response".into()))?;
        let best = video.url.trim();

        let mut candidates = Vec::new();
        if !best.is_empty() {
            candidates.push(PlaybackCandidate::new(
                BEST_WITH_AUDIO_FORMAT,
                ContainerType::Mp4,
                360,
                true,
                best,
            ));
        }

        for f in &video.formats {
            let Some(code) = format_code(&f.format_id) else {
                continue;
            };
            let Some(slot) = slot_for(code) else {
                continue;
            };
            let own = f.url.trim();
            let (url, substituted) = if own.is_empty() { (best, true) } else { (own, false) };
            if url.is_empty() {
                continue;
            }
            let candidate = match slot {
                FormatSlot::AudioOnly => PlaybackCandidate::audio_only(code, ContainerType::Mp4, url),
                FormatSlot::Video(res) => {
                    PlaybackCandidate::new(code, ContainerType::Mp4, res, substituted, url)
                }
            };
            candidates.push(candidate);
        }

        if candidates.is_empty() {
            return Err(ResolveError::ServiceResponseMalformed(
                "response has no usable url".into(),
            ));
        }
        Ok(CandidateSet::new(candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "videos": [{
            "url": "https://cdn/best",
            "formats": [
                {"format_id": "160", "url": "https://cdn/160"},
                {"format_id": "134", "url": "https://cdn/134"},
                {"format_id": "136", "url": ""},
                {"format_id": "137", "url": "https://cdn/137"},
                {"format_id": "139", "url": "https://cdn/139"},
                {"format_id": "251", "url": "https://cdn/251"},
                {"format_id": "266 - 3840x2160 (2160p)", "url": "https://cdn/266"}
            ]
        }]
    }"#;

    #[test]
    fn maps_known_codes_and_puts_best_first() {
        let set = ServiceResponse::from_json(BODY).unwrap().to_candidate_set().unwrap();
        let codes: Vec<u32> = set.iter().map(|c| c.format_code()).collect();
        assert_eq!(codes, vec![18, 134, 136, 137, 139, 266]);

        let best = set.iter().next().unwrap();
        assert_eq!(best.resolution(), 360);
        assert!(best.has_embedded_audio());
        assert_eq!(best.download_url(), "https://cdn/best");

        let uhd = set.iter().find(|c| c.format_code() == 266).unwrap();
        assert_eq!(uhd.resolution(), 2160);
        assert!(!uhd.has_embedded_audio());

        assert!(set.iter().find(|c| c.format_code() == 139).unwrap().is_audio_only());
        assert!(set.iter().all(|c| !c.requires_decryption()));
    }

    #[test]
    fn empty_format_url_uses_best() {
        let set = ServiceResponse::from_json(BODY).unwrap().to_candidate_set().unwrap();
        let hd = set.iter().find(|c| c.format_code() == 136).unwrap();
        assert_eq!(hd.download_url(), "https://cdn/best");
        assert_eq!(hd.resolution(), 720);
        assert!(hd.has_embedded_audio());
    }

    #[test]
    fn no_videos_is_malformed() {
        let err = ServiceResponse::from_json(r#"{"videos": []}"#)
            .unwrap()
            .to_candidate_set()
            .unwrap_err();
        assert!(matches!(err, ResolveError::ServiceResponseMalformed(_)));
    }

    #[test]
    fn bad_json_is_malformed() {
        let err = ServiceResponse::from_json("<html>502</html>").unwrap_err();
        assert!(matches!(err, ResolveError::ServiceResponseMalformed(_)));
    }

    #[test]
    fn no_usable_url_is_malformed() {
        let body = r#"{"videos": [{"url": "", "formats": [{"format_id": "137", "url": ""}]}]}"#;
        let err = ServiceResponse::from_json(body)
            .unwrap()
            .to_candidate_set()
            .unwrap_err();
        assert!(matches!(err, ResolveError::ServiceResponseMalformed(_)));
    }
}
