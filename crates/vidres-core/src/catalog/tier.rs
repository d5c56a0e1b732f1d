use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested playback quality, ordered by vertical resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Hd,
    FullHd,
    Uhd1440,
    Uhd2160,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Low,
        QualityTier::Hd,
        QualityTier::FullHd,
        QualityTier::Uhd1440,
        QualityTier::Uhd2160,
    ];

    /// Vertical resolution in pixels.
    pub fn resolution(self) -> u32 {
        match self {
            QualityTier::Low => 360,
            QualityTier::Hd => 720,
            QualityTier::FullHd => 1080,
            QualityTier::Uhd1440 => 1440,
            QualityTier::Uhd2160 => 2160,
        }
    }

    pub fn from_resolution(resolution: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.resolution() == resolution)
    }

    pub fn is_max(self) -> bool {
        self == QualityTier::Uhd2160
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityTier::Low => "low",
            QualityTier::Hd => "hd",
            QualityTier::FullHd => "fullhd",
            QualityTier::Uhd1440 => "uhd1440",
            QualityTier::Uhd2160 => "uhd2160",
        };
        f.write_str(s)
    }
}

impl FromStr for QualityTier {
    type Err = String;

    /// Accepts tier names (`hd`) and resolutions (`720`, `720p`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let by_name = Self::ALL.into_iter().find(|t| t.to_string() == lower);
        by_name
            .or_else(|| {
                lower
                    .trim_end_matches('p')
                    .parse::<u32>()
                    .ok()
                    .and_then(Self::from_resolution)
            })
            .ok_or_else(|| format!("unknown quality tier: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_by_resolution() {
        assert!(QualityTier::Low < QualityTier::Hd);
        assert!(QualityTier::Uhd1440 < QualityTier::Uhd2160);
        let mut sorted = QualityTier::ALL;
        sorted.sort_by_key(|t| t.resolution());
        assert_eq!(sorted, QualityTier::ALL);
    }

    #[test]
    fn parse_names_and_resolutions() {
        assert_eq!("hd".parse::<QualityTier>().unwrap(), QualityTier::Hd);
        assert_eq!("FullHD".parse::<QualityTier>().unwrap(), QualityTier::FullHd);
        assert_eq!("2160p".parse::<QualityTier>().unwrap(), QualityTier::Uhd2160);
        assert_eq!("360".parse::<QualityTier>().unwrap(), QualityTier::Low);
        assert!("480p".parse::<QualityTier>().is_err());
    }
}
